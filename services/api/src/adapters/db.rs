//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the direct-Postgres implementation
//! of the `ArticleStore` and `EpisodeStore` ports from the `core` crate. It reads
//! the same tables the REST API exposes, using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use podcast_core::{
    Article, ArticleStore, Episode, EpisodeStore, NewEpisode, PipelineError, PipelineResult,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const EPISODE_COLUMNS: &str = "id, title, description, publication_date, audio_url, \
    duration_seconds, script, article_ids, cover_image_url, play_count, created_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the article and episode ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ArticleRecord {
    id: Uuid,
    title: String,
    content: Option<String>,
    summary: Option<String>,
    url: Option<String>,
    published_at: Option<DateTime<Utc>>,
    source_name: Option<String>,
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
            source_name: self.source_name,
        }
    }
}

#[derive(FromRow)]
struct EpisodeRecord {
    id: Uuid,
    title: String,
    description: String,
    publication_date: NaiveDate,
    audio_url: String,
    duration_seconds: i32,
    script: String,
    article_ids: Vec<Uuid>,
    cover_image_url: Option<String>,
    play_count: i32,
    created_at: DateTime<Utc>,
}
impl EpisodeRecord {
    fn to_domain(self) -> Episode {
        Episode {
            id: self.id,
            title: self.title,
            description: self.description,
            publication_date: self.publication_date,
            audio_url: self.audio_url,
            duration_seconds: self.duration_seconds.max(0) as u32,
            script: self.script,
            article_ids: self.article_ids,
            cover_image_url: self.cover_image_url,
            play_count: self.play_count.max(0) as u32,
            created_at: Some(self.created_at),
        }
    }
}

//=========================================================================================
// `ArticleStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ArticleStore for DbAdapter {
    async fn fetch_latest_articles(&self, limit: usize) -> PipelineResult<Vec<Article>> {
        let records = sqlx::query_as::<_, ArticleRecord>(
            "SELECT a.id, a.title, a.content, a.summary, a.url, a.published_at, s.name AS source_name \
             FROM news_articles a LEFT JOIN news_sources s ON s.id = a.source_id \
             ORDER BY a.published_at DESC NULLS LAST LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PipelineError::Fetch(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

//=========================================================================================
// `EpisodeStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl EpisodeStore for DbAdapter {
    async fn record_episode(&self, episode: NewEpisode) -> PipelineResult<Episode> {
        let sql = format!(
            "INSERT INTO podcast_episodes \
             (title, description, publication_date, audio_url, duration_seconds, script, article_ids, cover_image_url) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            EPISODE_COLUMNS
        );
        let record = sqlx::query_as::<_, EpisodeRecord>(&sql)
            .bind(&episode.title)
            .bind(&episode.description)
            .bind(episode.publication_date)
            .bind(&episode.audio_url)
            .bind(i32::try_from(episode.duration_seconds).unwrap_or(i32::MAX))
            .bind(&episode.script)
            .bind(&episode.article_ids)
            .bind(&episode.cover_image_url)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PipelineError::Persist(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn episode_for_date(&self, date: NaiveDate) -> PipelineResult<Option<Episode>> {
        let sql = format!(
            "SELECT {} FROM podcast_episodes WHERE publication_date = $1 ORDER BY created_at ASC LIMIT 1",
            EPISODE_COLUMNS
        );
        let record = sqlx::query_as::<_, EpisodeRecord>(&sql)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| PipelineError::EpisodeLookup(e.to_string()))?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn list_episodes(&self, limit: usize) -> PipelineResult<Vec<Episode>> {
        let sql = format!(
            "SELECT {} FROM podcast_episodes ORDER BY publication_date DESC, created_at DESC LIMIT $1",
            EPISODE_COLUMNS
        );
        let records = sqlx::query_as::<_, EpisodeRecord>(&sql)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PipelineError::EpisodeLookup(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}
