//! crates/podcast_core/src/domain.rs
//!
//! Defines the pure, core data structures for the podcast pipeline.
//! These structs are independent of any database or serialization format.

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Source name used when an article has no joined news source.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// A scraped news article, read-only input to the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub source_name: Option<String>,
}

impl Article {
    /// The joined source name, or `"Unknown"` when the article has none.
    pub fn source(&self) -> &str {
        self.source_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_SOURCE)
    }

    /// The text read out for this story: content, falling back to summary.
    pub fn body(&self) -> Option<&str> {
        non_blank(self.content.as_deref()).or_else(|| non_blank(self.summary.as_deref()))
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.trim().is_empty())
}

/// Synthesized audio as returned by the speech API.
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub bytes: Bytes,
    pub content_type: String,
}

impl AudioPayload {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// An episode row that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEpisode {
    pub title: String,
    pub description: String,
    pub publication_date: NaiveDate,
    pub audio_url: String,
    pub duration_seconds: u32,
    pub script: String,
    pub article_ids: Vec<Uuid>,
    pub cover_image_url: Option<String>,
}

/// A persisted podcast episode.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub publication_date: NaiveDate,
    pub audio_url: String,
    pub duration_seconds: u32,
    pub script: String,
    pub article_ids: Vec<Uuid>,
    pub cover_image_url: Option<String>,
    pub play_count: u32,
    pub created_at: Option<DateTime<Utc>>,
}

/// The outcome of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct GeneratedEpisode {
    pub episode: Episode,
    pub articles: Vec<Article>,
    pub generated_at: DateTime<Utc>,
}
