//! services/api/src/adapters/tts.rs
//!
//! This module contains the adapter for the ElevenLabs Text-to-Speech service.
//! It implements the `SpeechSynthesizer` port from the `core` crate.

use async_trait::async_trait;
use podcast_core::{AudioPayload, PipelineError, PipelineResult, SpeechSynthesizer};
use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use super::http::failure_detail;

const OUTPUT_FORMAT: &str = "mp3_44100_128";
const STABILITY: f32 = 0.5;
const SIMILARITY_BOOST: f32 = 0.75;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `SpeechSynthesizer` port using the ElevenLabs API.
pub struct ElevenLabsTtsAdapter {
    client: Client,
    base_url: String,
    api_key: SecretString,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsTtsAdapter {
    /// Creates a new `ElevenLabsTtsAdapter`.
    pub fn new(
        client: Client,
        base_url: String,
        api_key: SecretString,
        voice_id: String,
        model_id: String,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            voice_id,
            model_id,
        }
    }
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

//=========================================================================================
// `SpeechSynthesizer` Trait Implementation
//=========================================================================================

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTtsAdapter {
    /// Sends the whole script in one request and returns the audio bytes.
    async fn synthesize(&self, script: &str) -> PipelineResult<AudioPayload> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);
        debug!(
            "ElevenLabs TTS request: model={}, voice={}, input_len={}",
            self.model_id,
            self.voice_id,
            script.len()
        );

        let body = SpeechRequest {
            text: script,
            model_id: &self.model_id,
            voice_settings: VoiceSettings {
                stability: STABILITY,
                similarity_boost: SIMILARITY_BOOST,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("output_format", OUTPUT_FORMAT)])
            .header("xi-api-key", self.api_key.expose_secret())
            .header(header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Synthesis(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Synthesis(failure_detail(response).await));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::Synthesis(e.to_string()))?;
        if bytes.is_empty() {
            return Err(PipelineError::Synthesis(
                "ElevenLabs returned an empty audio body".to_string(),
            ));
        }

        Ok(AudioPayload {
            bytes,
            content_type,
        })
    }

    fn voice(&self) -> &str {
        &self.voice_id
    }
}
