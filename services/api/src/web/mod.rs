pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod webhook;

pub use middleware::require_webhook_secret;
pub use rest::{health_handler, latest_podcast_handler, list_podcasts_handler};
pub use webhook::generate_podcast_handler;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::web::{rest::ApiDoc, state::AppState};

/// Builds the complete application router.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // The trigger takes any method; the handler enforces `TRIGGER_METHODS`.
    let trigger_routes = Router::new()
        .route("/generate-podcast", any(generate_podcast_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_webhook_secret,
        ));

    let public_routes = Router::new()
        .route("/podcasts", get(list_podcasts_handler))
        .route("/podcasts/latest", get(latest_podcast_handler))
        .route("/health", get(health_handler));

    let api_router = Router::new()
        .merge(trigger_routes)
        .merge(public_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
