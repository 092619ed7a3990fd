//! services/api/src/adapters/script_llm.rs
//!
//! This module contains the adapter for the script-writing LLM.
//! It implements the `ScriptGenerator` port from the `core` crate.

use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use podcast_core::{
    prompt::{build_news_prompt, NEWS_ANCHOR_PERSONA},
    Article, PipelineError, PipelineResult, ScriptGenerator,
};
use secrecy::{ExposeSecret, SecretString};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ScriptGenerator` using an OpenAI-compatible chat API.
#[derive(Clone)]
pub struct OpenAiScriptAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiScriptAdapter {
    /// Creates a new `OpenAiScriptAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Builds the OpenAI client on top of the shared HTTP client. The client's
    /// built-in retry of rate-limited and 5xx responses is switched off, so a
    /// failed call surfaces immediately.
    pub fn client(
        http: reqwest::Client,
        api_key: &SecretString,
        api_base: &str,
    ) -> Client<OpenAIConfig> {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(api_base);
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Client::with_config(config)
            .with_http_client(http)
            .with_backoff(no_retry)
    }
}

fn generation_error(e: OpenAIError) -> PipelineError {
    PipelineError::Generation(e.to_string())
}

//=========================================================================================
// `ScriptGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl ScriptGenerator for OpenAiScriptAdapter {
    /// Writes the broadcast script for the ordered articles.
    async fn generate_script(&self, articles: &[Article]) -> PipelineResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(NEWS_ANCHOR_PERSONA)
                .build()
                .map_err(generation_error)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_news_prompt(articles))
                .build()
                .map_err(generation_error)?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(generation_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(generation_error)?;

        // The first choice's text is returned as-is.
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PipelineError::Generation(
                    "Script LLM response contained no text content.".to_string(),
                )
            })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
