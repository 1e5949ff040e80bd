pub mod api;
pub mod config;
pub mod database;
pub mod food;
pub mod nutrition;
pub mod recommendations;

// Re-export commonly used items
pub use config::AppConfig;
pub use nutrition::NutrientTotals;
pub use recommendations::Recommendation;
