//! services/api/src/web/webhook.rs
//!
//! The generation trigger: runs the whole pipeline once per request.

use axum::{
    extract::State,
    http::Method,
    response::Json,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{ApiError, ErrorBody};
use crate::web::protocol::{GeneratePodcastResponse, GenerationMetadata};
use crate::web::state::AppState;

/// Generate a complete podcast episode.
///
/// Fetches the latest articles, writes the script, synthesizes audio, uploads it
/// and records the episode. Accepts the methods configured in `TRIGGER_METHODS`.
#[utoipa::path(
    post,
    path = "/generate-podcast",
    responses(
        (status = 200, description = "Episode generated", body = GeneratePodcastResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 404, description = "No articles available yet", body = ErrorBody),
        (status = 405, description = "Method not allowed", body = ErrorBody),
        (status = 409, description = "Episode already generated today", body = ErrorBody),
        (status = 500, description = "A downstream step failed", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn generate_podcast_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
) -> Result<Json<GeneratePodcastResponse>, ApiError> {
    if !state.config.trigger_methods.contains(&method) {
        warn!("Rejected trigger with method {}", method);
        return Err(ApiError::MethodNotAllowed(method));
    }

    info!("Podcast generation triggered via {}", method);
    let generated = state.pipeline.run().await?;

    let metadata = GenerationMetadata {
        model: state.pipeline.model().to_string(),
        voice: state.pipeline.voice().to_string(),
    };
    info!("Podcast generated successfully: {}", generated.episode.id);
    Ok(Json(GeneratePodcastResponse::new(generated, metadata)))
}
