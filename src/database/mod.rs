pub mod models;
pub mod supabase;

pub use supabase::{DatabaseError, SupabaseClient};
