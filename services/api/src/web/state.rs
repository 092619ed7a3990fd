//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and how it is wired from `Config`.

use crate::adapters::{
    build_http_client, BaasClient, BucketStorage, DbAdapter, ElevenLabsTtsAdapter,
    OpenAiScriptAdapter, RestStore,
};
use crate::config::{Config, StoreBackend};
use crate::error::ApiError;
use podcast_core::{ArticleStore, EpisodeStore, PipelineSettings, PodcastPipeline};
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
/// Nothing in it is mutated per request, so overlapping triggers run independently.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<PodcastPipeline>,
    pub episodes: Arc<dyn EpisodeStore>,
}

impl AppState {
    /// Builds every adapter from the configuration and assembles the pipeline.
    pub async fn from_config(config: Arc<Config>) -> Result<Self, ApiError> {
        let http = build_http_client(config.http_timeout)?;
        let baas = Arc::new(BaasClient::new(
            http.clone(),
            config.baas_base_url.clone(),
            copy_secret(&config.baas_api_key),
        ));

        // --- Article and episode store ---
        let (articles, episodes): (Arc<dyn ArticleStore>, Arc<dyn EpisodeStore>) =
            match config.store_backend {
                StoreBackend::Rest => {
                    info!("Using the REST store at {}", config.baas_base_url);
                    let store = Arc::new(RestStore::new(baas.clone()));
                    (store.clone() as Arc<dyn ArticleStore>, store as Arc<dyn EpisodeStore>)
                }
                StoreBackend::Postgres => {
                    let database_url = config.database_url.as_deref().ok_or_else(|| {
                        ApiError::Internal("DATABASE_URL is required for the postgres store".to_string())
                    })?;
                    info!("Connecting to database...");
                    let pool = PgPoolOptions::new()
                        .max_connections(5)
                        .connect(database_url)
                        .await?;
                    let db = Arc::new(DbAdapter::new(pool));
                    info!("Running database migrations...");
                    db.run_migrations().await?;
                    info!("Database migrations complete.");
                    (db.clone() as Arc<dyn ArticleStore>, db as Arc<dyn EpisodeStore>)
                }
            };

        // --- Generation adapters ---
        let scripts = Arc::new(OpenAiScriptAdapter::new(
            OpenAiScriptAdapter::client(
                http.clone(),
                &config.openai_api_key,
                &config.openai_base_url,
            ),
            config.script_model.clone(),
        ));
        let speech = Arc::new(ElevenLabsTtsAdapter::new(
            http,
            config.elevenlabs_base_url.clone(),
            copy_secret(&config.elevenlabs_api_key),
            config.tts_voice_id.clone(),
            config.tts_model_id.clone(),
        ));
        let storage = Arc::new(BucketStorage::new(baas, config.storage_bucket.clone()));

        let settings = PipelineSettings {
            article_limit: config.article_limit,
            dedupe_daily: config.dedupe_daily,
            cover_image_url: config.cover_image_url.clone(),
        };
        let pipeline = Arc::new(PodcastPipeline::new(
            articles,
            scripts,
            speech,
            storage,
            episodes.clone(),
            settings,
        ));

        Ok(Self {
            config,
            pipeline,
            episodes,
        })
    }
}

fn copy_secret(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}
