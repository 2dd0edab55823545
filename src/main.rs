use car_chat_svc::app::{create_app, init_tracing};
use car_chat_svc::config::Config;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize tracing/logging
    init_tracing(&config);

    info!("Starting car chat service...");
    info!(
        "Configuration loaded: bind={} models={:?} bot={} currency={} api_key_set={}",
        config.bind_address(),
        config.model_candidates,
        config.bot_name,
        config.currency,
        config.gemini_api_key.is_some()
    );

    // Create the application
    let app = match create_app(&config).await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to create app: {:#}", e);
            std::process::exit(1);
        }
    };

    // Create TCP listener
    let listener = match tokio::net::TcpListener::bind(&config.bind_address()).await {
        Ok(listener) => {
            info!("Server running on {}", config.server_url());
            info!("Health check: GET /health");
            info!("Chat endpoint: POST /api/chat");
            info!("VIN endpoint: GET /api/vin/{{vin}}");
            listener
        }
        Err(e) => {
            error!("Failed to bind to {}: {}", config.bind_address(), e);
            std::process::exit(1);
        }
    };

    // Start the server
    info!("Server starting...");
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
    } else {
        info!("Server shutdown gracefully");
    }
}
