use diet_tracker::api;
use diet_tracker::config::AppConfig;
use diet_tracker::database::SupabaseClient;
use diet_tracker::food::api::SpoonacularClient;
use diet_tracker::recommendations::RecommendationSource;

use clap::Parser;
use dotenv::dotenv;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables
    dotenv().ok();
    env_logger::init();

    // Parse command line arguments
    let args = Args::parse();

    // Configuration is resolved once here; a missing key fails startup
    // instead of individual requests.
    let config = AppConfig::from_env()?;

    let source: Arc<dyn RecommendationSource> =
        Arc::new(SpoonacularClient::new(config.spoonacular_api_key.clone()));
    let db = Arc::new(SupabaseClient::new(
        config.supabase_url.clone(),
        config.supabase_service_key.clone(),
    ));

    let app = api::create_api(source, db);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|e| format!("Failed to parse address: {}", e))?;

    info!("Starting diet-tracker API on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    Ok(())
}
