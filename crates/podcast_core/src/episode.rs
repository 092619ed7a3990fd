//! crates/podcast_core/src/episode.rs
//!
//! Episode metadata derived from the run time and the synthesized audio.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::domain::{Article, NewEpisode};

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Estimates playback length from payload size, assuming ~128 kbps
/// (one megabyte is about one minute).
pub fn estimate_duration_seconds(byte_len: usize) -> u32 {
    let minutes = byte_len as f64 / BYTES_PER_MEGABYTE;
    (minutes * 60.0).round() as u32
}

/// `Daily Brief - October 26, 2025`
pub fn episode_title(date: NaiveDate) -> String {
    format!("Daily Brief - {}", date.format("%B %d, %Y"))
}

pub fn episode_description(date: NaiveDate) -> String {
    format!("Your daily AI-generated neutral news podcast for {}", date.format("%Y-%m-%d"))
}

/// Storage object name for a run started at `at`, safe for paths and URLs.
pub fn audio_object_name(at: DateTime<Utc>) -> String {
    let stamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("podcast-{stamp}.mp3")
}

/// Assembles the row to persist. `article_ids` keeps the fetch order.
pub fn new_episode(
    generated_at: DateTime<Utc>,
    articles: &[Article],
    script: String,
    audio_url: String,
    audio_bytes: usize,
    cover_image_url: Option<String>,
) -> NewEpisode {
    let date = generated_at.date_naive();
    NewEpisode {
        title: episode_title(date),
        description: episode_description(date),
        publication_date: date,
        audio_url,
        duration_seconds: estimate_duration_seconds(audio_bytes),
        script,
        article_ids: articles.iter().map(|a| a.id).collect(),
        cover_image_url,
    }
}
