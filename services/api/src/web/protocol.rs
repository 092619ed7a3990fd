//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between HTTP clients (the scheduler that
//! fires the trigger, the podcast front end) and the API server.

use chrono::{DateTime, NaiveDate, Utc};
use podcast_core::{Article, Episode, GeneratedEpisode};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const SERVICE_NAME: &str = "podcast-generator";
pub const DEFAULT_LIST_LIMIT: usize = 10;
pub const MAX_LIST_LIMIT: usize = 100;

//=========================================================================================
// Generation Trigger
//=========================================================================================

/// One article as it was used in the episode.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

impl From<&Article> for ArticleSummary {
    fn from(a: &Article) -> Self {
        Self {
            id: a.id,
            title: a.title.clone(),
            source: a.source().to_string(),
            published_at: a.published_at,
            url: a.url.clone(),
        }
    }
}

/// Which model and voice produced the episode.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct GenerationMetadata {
    pub model: String,
    pub voice: String,
}

/// The payload returned after a successful generation run.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct GeneratePodcastResponse {
    pub success: bool,
    pub episode_id: Uuid,
    pub audio_url: String,
    pub duration_seconds: u32,
    pub articles_count: usize,
    pub generated_at: DateTime<Utc>,
    pub script: String,
    pub articles: Vec<ArticleSummary>,
    pub metadata: GenerationMetadata,
}

impl GeneratePodcastResponse {
    pub fn new(generated: GeneratedEpisode, metadata: GenerationMetadata) -> Self {
        let articles: Vec<ArticleSummary> = generated.articles.iter().map(ArticleSummary::from).collect();
        Self {
            success: true,
            episode_id: generated.episode.id,
            audio_url: generated.episode.audio_url,
            duration_seconds: generated.episode.duration_seconds,
            articles_count: articles.len(),
            generated_at: generated.generated_at,
            script: generated.episode.script,
            articles,
            metadata,
        }
    }
}

//=========================================================================================
// Episode Listing
//=========================================================================================

/// A stored episode as shown to listeners.
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct EpisodeView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub publication_date: NaiveDate,
    pub audio_url: String,
    pub duration_seconds: u32,
    pub cover_image_url: Option<String>,
    pub play_count: u32,
    pub article_ids: Vec<Uuid>,
}

impl From<Episode> for EpisodeView {
    fn from(e: Episode) -> Self {
        Self {
            id: e.id,
            title: e.title,
            description: e.description,
            publication_date: e.publication_date,
            audio_url: e.audio_url,
            duration_seconds: e.duration_seconds,
            cover_image_url: e.cover_image_url,
            play_count: e.play_count,
            article_ids: e.article_ids,
        }
    }
}

#[derive(Deserialize, Debug, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListEpisodesQuery {
    /// Maximum number of episodes to return (1-100, default 10).
    pub limit: Option<usize>,
}

impl ListEpisodesQuery {
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct EpisodeListResponse {
    pub episodes: Vec<EpisodeView>,
    pub count: usize,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct LatestEpisodeResponse {
    pub episode: Option<EpisodeView>,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
}
