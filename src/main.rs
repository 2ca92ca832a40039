//! Main entry point for the Image Generation Relay

use image_gen_relay::{
    api,
    config::Settings,
    generation::{orchestrator::Orchestrator, store::GenerationStore},
    provider::HttpProvider,
    AppState,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));

    if settings.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }

    info!("Starting Image Generation Relay");
    info!(
        "Loaded configuration: server={}:{}",
        settings.server.host, settings.server.port
    );

    let settings = Arc::new(settings);

    // Initialize the record store
    let store = Arc::new(GenerationStore::new());

    // Initialize the provider client and orchestrator worker
    let provider = Arc::new(HttpProvider::new(&settings.provider)?);
    let orchestrator = Arc::new(Orchestrator::new(store.clone(), provider));

    // Create application state
    let app_state = Arc::new(AppState {
        settings: settings.clone(),
        store,
        orchestrator,
    });

    // Build the router
    let app = api::routes::create_router(app_state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
