//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the read-only REST endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ApiError, ErrorBody};
use crate::web::protocol::{
    ArticleSummary, EpisodeListResponse, EpisodeView, GeneratePodcastResponse,
    GenerationMetadata, HealthResponse, LatestEpisodeResponse, ListEpisodesQuery, SERVICE_NAME,
};
use crate::web::state::AppState;
use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::error;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::webhook::generate_podcast_handler,
        list_podcasts_handler,
        latest_podcast_handler,
        health_handler,
    ),
    components(
        schemas(
            GeneratePodcastResponse,
            GenerationMetadata,
            ArticleSummary,
            EpisodeView,
            EpisodeListResponse,
            LatestEpisodeResponse,
            HealthResponse,
            ErrorBody,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Daily Brief API", description = "Generates and serves the daily AI news podcast.")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` scheme used by the generation trigger.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List recent podcast episodes, newest first.
#[utoipa::path(
    get,
    path = "/podcasts",
    params(ListEpisodesQuery),
    responses(
        (status = 200, description = "Recent episodes", body = EpisodeListResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn list_podcasts_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListEpisodesQuery>,
) -> Result<Json<EpisodeListResponse>, ApiError> {
    let episodes = state
        .episodes
        .list_episodes(query.effective_limit())
        .await
        .map_err(|e| {
            error!("Failed to list episodes: {}", e);
            ApiError::from(e)
        })?;

    let episodes: Vec<EpisodeView> = episodes.into_iter().map(EpisodeView::from).collect();
    Ok(Json(EpisodeListResponse {
        count: episodes.len(),
        episodes,
    }))
}

/// Get today's podcast episode.
#[utoipa::path(
    get,
    path = "/podcasts/latest",
    responses(
        (status = 200, description = "Today's episode, if one exists", body = LatestEpisodeResponse),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn latest_podcast_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LatestEpisodeResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let episode = state.episodes.episode_for_date(today).await.map_err(|e| {
        error!("Failed to look up today's episode: {}", e);
        ApiError::from(e)
    })?;

    let response = match episode {
        Some(episode) => LatestEpisodeResponse {
            episode: Some(episode.into()),
            found: true,
            message: None,
        },
        None => LatestEpisodeResponse {
            episode: None,
            found: false,
            message: Some("No episode for today yet".to_string()),
        },
    };
    Ok(Json(response))
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: Utc::now(),
    })
}
