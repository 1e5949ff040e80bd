use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub spoonacular_api_key: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            spoonacular_api_key: env::var("SPOONACULAR_API_KEY")
                .map_err(|_| "SPOONACULAR_API_KEY environment variable not set".to_string())?,
            supabase_url: env::var("SUPABASE_URL")
                .map_err(|_| "SUPABASE_URL environment variable not set".to_string())?,
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .map_err(|_| "SUPABASE_SERVICE_KEY environment variable not set".to_string())?,
        })
    }
}
