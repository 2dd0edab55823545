use std::sync::Arc;

use axum::{Extension, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::chat_workflow::{AssistantSettings, ChatAssistant};
use crate::config::Config;
use crate::listings::MemoryListingStore;
use crate::llm::GeminiModel;
use crate::routes::create_routes;
use crate::vin::VinDecoder;

/// Initialize tracing and logging for the application
pub fn init_tracing(config: &Config) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| {
                "car_chat_svc=info,tower_http=debug,axum::rejection=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Builds the chat assistant with the configured model backend and listings
pub fn build_assistant(config: &Config) -> anyhow::Result<ChatAssistant> {
    let store = match &config.listings_file {
        Some(path) => MemoryListingStore::from_file(path)?,
        None => {
            warn!("LISTINGS_FILE not set; starting with an empty listings store");
            MemoryListingStore::default()
        }
    };
    info!("Listings store ready with {} listings", store.len());

    let model = GeminiModel::new(config.gemini_api_key.as_deref());
    info!("Model candidates: {:?}", config.model_candidates);

    Ok(ChatAssistant::new(
        Arc::new(model),
        Arc::new(store),
        AssistantSettings::from_config(config),
    ))
}

/// Create and configure the Axum application with all routes and middleware
pub async fn create_app(config: &Config) -> Result<Router, anyhow::Error> {
    info!("Initializing application router");

    let assistant = build_assistant(config)?;
    let vin_decoder = VinDecoder::new(&config.vin_api_base)?;
    info!("Chat assistant '{}' initialized", assistant.bot_name());

    Ok(Router::new()
        .merge(create_routes())
        .layer(Extension(Arc::new(assistant)))
        .layer(Extension(vin_decoder))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()))
}
