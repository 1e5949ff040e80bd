pub mod spoonacular;

// Re-export common types
pub use spoonacular::SpoonacularClient;
