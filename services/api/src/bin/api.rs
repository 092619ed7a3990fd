//! services/api/src/bin/api.rs

use podcast_api::{
    config::Config,
    error::ApiError,
    init_tracing,
    web::{build_router, state::AppState},
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    init_tracing(config.log_level);
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize Store & Service Adapters ---
    let app_state = Arc::new(AppState::from_config(config.clone()).await?);
    info!(
        "Pipeline ready: model={}, voice={}, articles per episode={}",
        app_state.pipeline.model(),
        app_state.pipeline.voice(),
        config.article_limit
    );
    if config.webhook_secret.is_none() {
        info!("WEBHOOK_SECRET is not set; the trigger accepts unauthenticated calls");
    }

    // --- 3. Create the Web Router ---
    let app = build_router(app_state);

    // --- 4. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
