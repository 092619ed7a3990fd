//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use axum::http::Method;
use podcast_core::DEFAULT_ARTICLE_LIMIT;
use secrecy::SecretString;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where articles are read from and episodes written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// The backend's PostgREST-style `/rest/v1` API.
    Rest,
    /// Direct Postgres access through `DATABASE_URL`.
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(format!("'{}' is not one of rest, postgres", other)),
        }
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub http_timeout: Duration,

    // --- Backend-as-a-service (database + object storage) ---
    pub baas_base_url: String,
    pub baas_api_key: SecretString,
    pub storage_bucket: String,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,

    // --- Completion API ---
    pub openai_api_key: SecretString,
    pub openai_base_url: String,
    pub script_model: String,

    // --- Speech API ---
    pub elevenlabs_api_key: SecretString,
    pub elevenlabs_base_url: String,
    pub tts_voice_id: String,
    pub tts_model_id: String,

    // --- Pipeline and trigger ---
    pub article_limit: usize,
    pub webhook_secret: Option<SecretString>,
    pub trigger_methods: Vec<Method>,
    pub dedupe_daily: bool,
    pub cover_image_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        // --- Load Server Settings ---
        let bind_address = parse_var("BIND_ADDRESS", &or_default("BIND_ADDRESS", "0.0.0.0:8081"))?;

        let log_level_str = or_default("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let http_timeout =
            Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", &or_default("HTTP_TIMEOUT_SECS", "120"))?);

        // --- Load Backend Settings ---
        let baas_base_url = trim_base_url(required("BAAS_BASE_URL")?);
        let baas_api_key = SecretString::from(required("BAAS_API_KEY")?);
        let storage_bucket = or_default("STORAGE_BUCKET", "podcast-episodes");
        let store_backend = or_default("STORE_BACKEND", "rest")
            .parse::<StoreBackend>()
            .map_err(|e| ConfigError::InvalidValue("STORE_BACKEND".to_string(), e))?;
        let database_url = match store_backend {
            StoreBackend::Postgres => Some(required("DATABASE_URL")?),
            StoreBackend::Rest => get("DATABASE_URL"),
        };

        // --- Load API Keys and Adapter-specific Settings ---
        let openai_api_key = SecretString::from(required("OPENAI_API_KEY")?);
        let openai_base_url = trim_base_url(or_default("OPENAI_BASE_URL", "https://api.openai.com/v1"));
        let script_model = or_default("SCRIPT_MODEL", "gpt-5-mini");

        let elevenlabs_api_key = SecretString::from(required("ELEVENLABS_API_KEY")?);
        let elevenlabs_base_url =
            trim_base_url(or_default("ELEVENLABS_BASE_URL", "https://api.elevenlabs.io"));
        let tts_voice_id = or_default("TTS_VOICE_ID", "UgBBYS2sOqTuMpoF3BR0");
        let tts_model_id = or_default("TTS_MODEL_ID", "eleven_multilingual_v2");

        // --- Load Pipeline Settings ---
        let article_limit: usize = parse_var(
            "ARTICLE_LIMIT",
            &or_default("ARTICLE_LIMIT", &DEFAULT_ARTICLE_LIMIT.to_string()),
        )?;
        if !(1..=50).contains(&article_limit) {
            return Err(ConfigError::InvalidValue(
                "ARTICLE_LIMIT".to_string(),
                format!("{} is outside 1..=50", article_limit),
            ));
        }

        let webhook_secret = get("WEBHOOK_SECRET").map(SecretString::from);
        let trigger_methods = parse_methods(&or_default("TRIGGER_METHODS", "POST"))?;
        let dedupe_daily = parse_var("DEDUPE_DAILY", &or_default("DEDUPE_DAILY", "false"))?;
        let cover_image_url = get("COVER_IMAGE_URL");

        Ok(Self {
            bind_address,
            log_level,
            http_timeout,
            baas_base_url,
            baas_api_key,
            storage_bucket,
            store_backend,
            database_url,
            openai_api_key,
            openai_base_url,
            script_model,
            elevenlabs_api_key,
            elevenlabs_base_url,
            tts_voice_id,
            tts_model_id,
            article_limit,
            webhook_secret,
            trigger_methods,
            dedupe_daily,
            cover_image_url,
        })
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

fn trim_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_methods(raw: &str) -> Result<Vec<Method>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| match m.to_ascii_uppercase().as_str() {
            "POST" => Ok(Method::POST),
            "GET" => Ok(Method::GET),
            other => Err(ConfigError::InvalidValue(
                "TRIGGER_METHODS".to_string(),
                format!("'{}' is not one of POST, GET", other),
            )),
        })
        .collect()
}
