//! services/api/src/adapters/rest_store.rs
//!
//! Article and episode storage through the backend's PostgREST-style `/rest/v1` API.
//! It implements the `ArticleStore` and `EpisodeStore` ports from the `core` crate.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use podcast_core::{
    Article, ArticleStore, Episode, EpisodeStore, NewEpisode, PipelineError, PipelineResult,
};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::http::{failure_detail, BaasClient};

const ARTICLE_COLUMNS: &str = "id,title,content,summary,url,published_at,news_sources(id,name)";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Reads `news_articles` and reads/writes `podcast_episodes` over HTTP.
#[derive(Clone)]
pub struct RestStore {
    baas: Arc<BaasClient>,
}

impl RestStore {
    pub fn new(baas: Arc<BaasClient>) -> Self {
        Self { baas }
    }

    async fn select_episodes(&self, query: &[(&str, String)]) -> PipelineResult<Vec<Episode>> {
        let response = self
            .baas
            .request(Method::GET, "/rest/v1/podcast_episodes")
            .query(query)
            .send()
            .await
            .map_err(|e| PipelineError::EpisodeLookup(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::EpisodeLookup(failure_detail(response).await));
        }

        let records: Vec<EpisodeRecord> = response
            .json()
            .await
            .map_err(|e| PipelineError::EpisodeLookup(e.to_string()))?;
        Ok(records.into_iter().map(EpisodeRecord::to_domain).collect())
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Deserialize)]
struct SourceRecord {
    name: Option<String>,
}

#[derive(Deserialize)]
struct ArticleRecord {
    id: Uuid,
    title: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    news_sources: Option<SourceRecord>,
}

impl ArticleRecord {
    fn to_domain(self) -> Article {
        Article {
            id: self.id,
            title: self.title,
            content: self.content,
            summary: self.summary,
            url: self.url,
            published_at: self.published_at,
            source_name: self.news_sources.and_then(|s| s.name),
        }
    }
}

#[derive(Serialize)]
struct NewEpisodeRecord<'a> {
    title: &'a str,
    description: &'a str,
    publication_date: NaiveDate,
    audio_url: &'a str,
    duration_seconds: u32,
    script: &'a str,
    article_ids: &'a [Uuid],
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_image_url: Option<&'a str>,
}

impl<'a> From<&'a NewEpisode> for NewEpisodeRecord<'a> {
    fn from(e: &'a NewEpisode) -> Self {
        Self {
            title: &e.title,
            description: &e.description,
            publication_date: e.publication_date,
            audio_url: &e.audio_url,
            duration_seconds: e.duration_seconds,
            script: &e.script,
            article_ids: &e.article_ids,
            cover_image_url: e.cover_image_url.as_deref(),
        }
    }
}

#[derive(Deserialize)]
struct EpisodeRecord {
    id: Uuid,
    title: String,
    #[serde(default)]
    description: Option<String>,
    publication_date: NaiveDate,
    audio_url: String,
    #[serde(default)]
    duration_seconds: Option<i64>,
    #[serde(default)]
    script: Option<String>,
    #[serde(default)]
    article_ids: Option<Vec<Uuid>>,
    #[serde(default)]
    cover_image_url: Option<String>,
    #[serde(default)]
    play_count: Option<i64>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl EpisodeRecord {
    fn to_domain(self) -> Episode {
        Episode {
            id: self.id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            publication_date: self.publication_date,
            audio_url: self.audio_url,
            duration_seconds: clamp_u32(self.duration_seconds),
            script: self.script.unwrap_or_default(),
            article_ids: self.article_ids.unwrap_or_default(),
            cover_image_url: self.cover_image_url,
            play_count: clamp_u32(self.play_count),
            created_at: self.created_at,
        }
    }
}

fn clamp_u32(value: Option<i64>) -> u32 {
    value
        .map(|v| v.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

//=========================================================================================
// `ArticleStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ArticleStore for RestStore {
    async fn fetch_latest_articles(&self, limit: usize) -> PipelineResult<Vec<Article>> {
        debug!("Requesting {} articles from {}", limit, self.baas.base_url());

        let response = self
            .baas
            .request(Method::GET, "/rest/v1/news_articles")
            .query(&[
                ("select", ARTICLE_COLUMNS.to_string()),
                ("order", "published_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Fetch(failure_detail(response).await));
        }

        let records: Vec<ArticleRecord> = response
            .json()
            .await
            .map_err(|e| PipelineError::Fetch(e.to_string()))?;
        Ok(records.into_iter().map(ArticleRecord::to_domain).collect())
    }
}

//=========================================================================================
// `EpisodeStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl EpisodeStore for RestStore {
    async fn record_episode(&self, episode: NewEpisode) -> PipelineResult<Episode> {
        let response = self
            .baas
            .request(Method::POST, "/rest/v1/podcast_episodes")
            .header("Prefer", "return=representation")
            .json(&NewEpisodeRecord::from(&episode))
            .send()
            .await
            .map_err(|e| PipelineError::Persist(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Persist(failure_detail(response).await));
        }

        // PostgREST answers with an array; some backends return the bare row.
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PipelineError::Persist(e.to_string()))?;
        let row = match body {
            serde_json::Value::Array(rows) => rows.into_iter().next(),
            other => Some(other),
        }
        .ok_or_else(|| PipelineError::Persist("no row returned for the new episode".to_string()))?;

        let record: EpisodeRecord =
            serde_json::from_value(row).map_err(|e| PipelineError::Persist(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn episode_for_date(&self, date: NaiveDate) -> PipelineResult<Option<Episode>> {
        let episodes = self
            .select_episodes(&[
                ("select", "*".to_string()),
                ("publication_date", format!("eq.{}", date)),
                ("order", "created_at.asc".to_string()),
                ("limit", "1".to_string()),
            ])
            .await?;
        Ok(episodes.into_iter().next())
    }

    async fn list_episodes(&self, limit: usize) -> PipelineResult<Vec<Episode>> {
        self.select_episodes(&[
            ("select", "*".to_string()),
            ("order", "publication_date.desc,created_at.desc".to_string()),
            ("limit", limit.to_string()),
        ])
        .await
    }
}
