//! crates/podcast_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the pipeline's external collaborators.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the concrete HTTP APIs and databases behind them.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Article, AudioPayload, Episode, NewEpisode};

//=========================================================================================
// Pipeline Error and Result Types
//=========================================================================================

/// Every failure the pipeline can surface. Each port maps its downstream
/// failure into exactly one of these at the call site.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to fetch articles: {0}")]
    Fetch(String),
    #[error("No articles found. Please run the scraper first.")]
    NoArticles,
    #[error("Failed to generate script: {0}")]
    Generation(String),
    #[error("Failed to synthesize audio: {0}")]
    Synthesis(String),
    #[error("Failed to upload to storage: {0}")]
    Storage(String),
    #[error("Failed to save episode: {0}")]
    Persist(String),
    #[error("Failed to read episodes: {0}")]
    EpisodeLookup(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An episode for {date} already exists ({episode_id})")]
    AlreadyGenerated { date: NaiveDate, episode_id: Uuid },
}

/// A convenience type alias for `Result<T, PipelineError>`.
pub type PipelineResult<T> = Result<T, PipelineError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Returns at most `limit` articles, newest first. An empty vec is not an error here.
    async fn fetch_latest_articles(&self, limit: usize) -> PipelineResult<Vec<Article>>;
}

#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    /// Turns the ordered article list into a spoken-word script.
    async fn generate_script(&self, articles: &[Article]) -> PipelineResult<String>;

    /// The completion model identifier, reported in run metadata.
    fn model(&self) -> &str;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Generates audio data from the full script text.
    async fn synthesize(&self, script: &str) -> PipelineResult<AudioPayload>;

    /// The voice identifier, reported in run metadata.
    fn voice(&self) -> &str;
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores the payload under `object_name` and returns its public URL.
    async fn upload_audio(&self, object_name: &str, payload: &AudioPayload)
        -> PipelineResult<String>;
}

#[async_trait]
pub trait EpisodeStore: Send + Sync {
    /// Inserts one episode row and returns the created representation.
    async fn record_episode(&self, episode: NewEpisode) -> PipelineResult<Episode>;

    /// The first episode published on `date`, if any.
    async fn episode_for_date(&self, date: NaiveDate) -> PipelineResult<Option<Episode>>;

    /// The most recent episodes, newest first.
    async fn list_episodes(&self, limit: usize) -> PipelineResult<Vec<Episode>>;
}
