//! crates/podcast_core/src/pipeline.rs
//!
//! The episode generation pipeline: fetch articles, write the script, synthesize
//! audio, upload it, and record the episode. Each stage consumes the previous
//! stage's output and the run stops at the first error. Nothing is retried and
//! nothing is rolled back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::domain::GeneratedEpisode;
use crate::episode::{audio_object_name, new_episode};
use crate::ports::{
    ArticleStore, EpisodeStore, ObjectStorage, PipelineError, PipelineResult, ScriptGenerator,
    SpeechSynthesizer,
};

pub const DEFAULT_ARTICLE_LIMIT: usize = 5;

/// Run-level knobs that are not tied to a single collaborator.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub article_limit: usize,
    /// Refuse to run when an episode already exists for the run date.
    pub dedupe_daily: bool,
    pub cover_image_url: Option<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            article_limit: DEFAULT_ARTICLE_LIMIT,
            dedupe_daily: false,
            cover_image_url: None,
        }
    }
}

/// Sequences the five collaborators for one trigger. Holds no per-run state,
/// so one instance is shared by every concurrent request.
pub struct PodcastPipeline {
    articles: Arc<dyn ArticleStore>,
    scripts: Arc<dyn ScriptGenerator>,
    speech: Arc<dyn SpeechSynthesizer>,
    storage: Arc<dyn ObjectStorage>,
    episodes: Arc<dyn EpisodeStore>,
    settings: PipelineSettings,
}

impl PodcastPipeline {
    pub fn new(
        articles: Arc<dyn ArticleStore>,
        scripts: Arc<dyn ScriptGenerator>,
        speech: Arc<dyn SpeechSynthesizer>,
        storage: Arc<dyn ObjectStorage>,
        episodes: Arc<dyn EpisodeStore>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            articles,
            scripts,
            speech,
            storage,
            episodes,
            settings,
        }
    }

    pub fn model(&self) -> &str {
        self.scripts.model()
    }

    pub fn voice(&self) -> &str {
        self.speech.voice()
    }

    /// Runs the pipeline stamped with the current time.
    pub async fn run(&self) -> PipelineResult<GeneratedEpisode> {
        self.run_at(Utc::now()).await
    }

    /// Runs the pipeline as if started at `now`.
    pub async fn run_at(&self, now: DateTime<Utc>) -> PipelineResult<GeneratedEpisode> {
        let result = self.execute(now).await;
        if let Err(e) = &result {
            error!("Episode generation failed: {}", e);
        }
        result
    }

    async fn execute(&self, now: DateTime<Utc>) -> PipelineResult<GeneratedEpisode> {
        let date = now.date_naive();
        if self.settings.dedupe_daily {
            if let Some(existing) = self.episodes.episode_for_date(date).await? {
                return Err(PipelineError::AlreadyGenerated {
                    date,
                    episode_id: existing.id,
                });
            }
        }

        info!("Fetching up to {} articles", self.settings.article_limit);
        let articles = self
            .articles
            .fetch_latest_articles(self.settings.article_limit)
            .await?;
        if articles.is_empty() {
            return Err(PipelineError::NoArticles);
        }
        info!("Found {} articles", articles.len());

        info!("Generating script with {}", self.scripts.model());
        let script = self.scripts.generate_script(&articles).await?;
        info!("Script generated ({} characters)", script.len());

        info!("Synthesizing audio with voice {}", self.speech.voice());
        let audio = self.speech.synthesize(&script).await?;
        info!("Audio generated ({} bytes)", audio.len());

        let object_name = audio_object_name(now);
        let audio_url = self.storage.upload_audio(&object_name, &audio).await?;
        if audio_url.trim().is_empty() {
            return Err(PipelineError::Storage(format!(
                "storage returned an empty URL for {object_name}"
            )));
        }
        info!("Uploaded audio to {}", audio_url);

        let draft = new_episode(
            now,
            &articles,
            script,
            audio_url,
            audio.len(),
            self.settings.cover_image_url.clone(),
        );
        let episode = self.episodes.record_episode(draft).await?;
        info!("Episode {} saved", episode.id);

        Ok(GeneratedEpisode {
            episode,
            articles,
            generated_at: now,
        })
    }
}
