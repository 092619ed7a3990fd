//! services/api/src/web/middleware.rs
//!
//! Shared-secret authentication for the generation trigger.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use podcast_core::PipelineError;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::warn;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Middleware that checks `Authorization: Bearer <secret>` against `WEBHOOK_SECRET`.
///
/// Without a configured secret every request passes. On a missing or wrong
/// token the request is rejected with 401 before the handler runs, so no
/// downstream API is called.
pub async fn require_webhook_secret(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(secret) = state.config.webhook_secret.as_ref() else {
        return Ok(next.run(req).await);
    };

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    if token != Some(secret.expose_secret()) {
        warn!("Rejected trigger with a missing or invalid bearer token");
        return Err(PipelineError::Unauthorized.into());
    }

    Ok(next.run(req).await)
}
