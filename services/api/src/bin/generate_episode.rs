//! services/api/src/bin/generate_episode.rs
//!
//! Runs the generation pipeline once, without the HTTP server, and prints the
//! resulting episode as JSON. Intended for cron jobs and manual runs.

use podcast_api::{
    config::Config,
    error::ApiError,
    init_tracing,
    web::{
        protocol::{GeneratePodcastResponse, GenerationMetadata},
        state::AppState,
    },
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    let config = Arc::new(Config::from_env()?);
    init_tracing(config.log_level);

    let state = AppState::from_config(config).await?;
    info!("Generating a podcast episode...");
    let generated = state.pipeline.run().await?;

    let response = GeneratePodcastResponse::new(
        generated,
        GenerationMetadata {
            model: state.pipeline.model().to_string(),
            voice: state.pipeline.voice().to_string(),
        },
    );
    let json = serde_json::to_string_pretty(&response)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    println!("{}", json);

    Ok(())
}
