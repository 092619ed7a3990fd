//! Test harness: a mock of every upstream the pipeline talks to, and a helper
//! that drives the real router against it.
//!
//! One axum server plays the REST database, the object storage, the chat
//! completion API and the speech API, counting every call it receives.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{routing, Json, Router};
use podcast_api::config::Config;
use podcast_api::web::{build_router, state::AppState};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use uuid::Uuid;

pub const API_KEY: &str = "anon-key";
pub const ONE_MEGABYTE: usize = 1_048_576;

/// Which upstream should answer with an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Upstream {
    Articles,
    Completion,
    /// The completion call succeeds with no choices.
    EmptyCompletion,
    Speech,
    /// The speech call succeeds with an empty body.
    EmptySpeech,
    Storage,
    Episodes,
    /// Reads of the episode table fail; writes still work.
    EpisodeReads,
}

pub struct MockBackend {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    articles: Value,
    fail: Option<Upstream>,
    audio_len: usize,
    article_requests: AtomicU32,
    completion_requests: AtomicU32,
    speech_requests: AtomicU32,
    upload_requests: AtomicU32,
    episode_writes: AtomicU32,
    article_queries: Mutex<Vec<HashMap<String, String>>>,
    episode_queries: Mutex<Vec<HashMap<String, String>>>,
    episodes: Mutex<Vec<Value>>,
    uploads: Mutex<Vec<Upload>>,
    baas_keys: Mutex<Vec<Option<String>>>,
    speech_bodies: Mutex<Vec<Value>>,
}

#[derive(Clone, Debug)]
pub struct Upload {
    pub bucket: String,
    pub name: String,
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub len: usize,
}

impl MockBackend {
    pub async fn start(articles: Value, fail: Option<Upstream>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            articles,
            fail,
            audio_len: ONE_MEGABYTE,
            article_requests: AtomicU32::new(0),
            completion_requests: AtomicU32::new(0),
            speech_requests: AtomicU32::new(0),
            upload_requests: AtomicU32::new(0),
            episode_writes: AtomicU32::new(0),
            article_queries: Mutex::new(Vec::new()),
            episode_queries: Mutex::new(Vec::new()),
            episodes: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            baas_keys: Mutex::new(Vec::new()),
            speech_bodies: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/rest/v1/news_articles", routing::get(handle_articles))
            .route(
                "/rest/v1/podcast_episodes",
                routing::get(handle_list_episodes).post(handle_create_episode),
            )
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .route("/v1/text-to-speech/{voice_id}", routing::post(handle_speech))
            .route(
                "/api/storage/buckets/{bucket}/objects/{name}",
                routing::post(handle_upload),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn article_requests(&self) -> u32 {
        self.state.article_requests.load(Ordering::Relaxed)
    }

    pub fn completion_requests(&self) -> u32 {
        self.state.completion_requests.load(Ordering::Relaxed)
    }

    pub fn speech_requests(&self) -> u32 {
        self.state.speech_requests.load(Ordering::Relaxed)
    }

    pub fn upload_requests(&self) -> u32 {
        self.state.upload_requests.load(Ordering::Relaxed)
    }

    pub fn episode_writes(&self) -> u32 {
        self.state.episode_writes.load(Ordering::Relaxed)
    }

    /// Total number of calls to any upstream.
    pub fn total_requests(&self) -> u32 {
        self.article_requests()
            + self.completion_requests()
            + self.speech_requests()
            + self.upload_requests()
            + self.episode_writes()
    }

    pub fn article_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.article_queries.lock().unwrap().clone()
    }

    pub fn episode_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.episode_queries.lock().unwrap().clone()
    }

    pub fn episodes(&self) -> Vec<Value> {
        self.state.episodes.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<Upload> {
        self.state.uploads.lock().unwrap().clone()
    }

    pub fn baas_keys(&self) -> Vec<Option<String>> {
        self.state.baas_keys.lock().unwrap().clone()
    }

    pub fn speech_bodies(&self) -> Vec<Value> {
        self.state.speech_bodies.lock().unwrap().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn record_key(state: &MockState, headers: &HeaderMap) {
    let key = headers
        .get("apikey")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.baas_keys.lock().unwrap().push(key);
}

async fn handle_articles(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.article_requests.fetch_add(1, Ordering::Relaxed);
    record_key(&state, &headers);
    state.article_queries.lock().unwrap().push(query.clone());

    if state.fail == Some(Upstream::Articles) {
        return (StatusCode::SERVICE_UNAVAILABLE, "database is waking up").into_response();
    }

    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let rows: Vec<Value> = state
        .articles
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .take(limit)
        .collect();
    Json(Value::Array(rows)).into_response()
}

async fn handle_list_episodes(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record_key(&state, &headers);
    state.episode_queries.lock().unwrap().push(query.clone());

    if state.fail == Some(Upstream::EpisodeReads) {
        return (StatusCode::BAD_GATEWAY, "bad gateway").into_response();
    }

    let date = query
        .get("publication_date")
        .and_then(|d| d.strip_prefix("eq."))
        .map(str::to_string);
    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);

    // Rows are kept in insertion order; anything but `created_at.asc` reads newest first.
    let oldest_first = query.get("order").map(String::as_str) == Some("created_at.asc");
    let mut rows: Vec<Value> = state
        .episodes
        .lock()
        .unwrap()
        .iter()
        .filter(|e| match &date {
            Some(d) => e["publication_date"] == *d,
            None => true,
        })
        .cloned()
        .collect();
    if !oldest_first {
        rows.reverse();
    }
    rows.truncate(limit);
    Json(Value::Array(rows)).into_response()
}

async fn handle_create_episode(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    state.episode_writes.fetch_add(1, Ordering::Relaxed);
    record_key(&state, &headers);

    if state.fail == Some(Upstream::Episodes) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "new row violates check constraint" })),
        )
            .into_response();
    }

    let prefer = headers.get("prefer").and_then(|v| v.to_str().ok());
    body["id"] = json!(Uuid::new_v4());
    body["play_count"] = json!(0);
    body["created_at"] = json!("2025-10-26T09:30:00+00:00");
    state.episodes.lock().unwrap().push(body.clone());

    if prefer == Some("return=representation") {
        (StatusCode::CREATED, Json(json!([body]))).into_response()
    } else {
        StatusCode::CREATED.into_response()
    }
}

async fn handle_chat_completions(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.completion_requests.fetch_add(1, Ordering::Relaxed);

    if state.fail == Some(Upstream::Completion) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "message": "The model does not exist",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": "model_not_found"
                }
            })),
        )
            .into_response();
    }

    if state.fail == Some(Upstream::EmptyCompletion) {
        return Json(json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "created": 1761469800,
            "model": body["model"],
            "choices": []
        }))
        .into_response();
    }

    let prompt = body["messages"][1]["content"].as_str().unwrap_or_default();
    let stories = prompt.matches("\nStory ").count();
    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": 1761469800,
        "model": body["model"],
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": format!("Good morning, this is Neutral Network with {stories} stories."),
                "refusal": null
            },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 10, "total_tokens": 20 }
    }))
    .into_response()
}

async fn handle_speech(
    State(state): State<Arc<MockState>>,
    Path(_voice_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.speech_requests.fetch_add(1, Ordering::Relaxed);
    state.speech_bodies.lock().unwrap().push(body);

    if state.fail == Some(Upstream::Speech) || headers.get("xi-api-key").is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": { "status": "invalid_api_key" } })),
        )
            .into_response();
    }

    let audio = if state.fail == Some(Upstream::EmptySpeech) {
        Vec::new()
    } else {
        vec![0x49u8; state.audio_len]
    };

    // Some accounts get a generic binary type back instead of audio/mpeg.
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .body(Body::from(audio))
        .unwrap()
}

async fn handle_upload(
    State(state): State<Arc<MockState>>,
    Path((bucket, name)): Path<(String, String)>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    state.upload_requests.fetch_add(1, Ordering::Relaxed);
    record_key(&state, &headers);

    if state.fail == Some(Upstream::Storage) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Bucket not found" })),
        )
            .into_response();
    }

    while let Ok(Some(field)) = multipart.next_field().await {
        let upload = Upload {
            bucket: bucket.clone(),
            name: name.clone(),
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            len: 0,
        };
        let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        state.uploads.lock().unwrap().push(Upload { len, ..upload });
    }

    (StatusCode::CREATED, Json(json!({ "key": name, "bucket": bucket }))).into_response()
}

//=========================================================================================
// Fixtures
//=========================================================================================

/// Five articles, newest first, the way the REST API returns them.
pub fn five_articles() -> Value {
    json!([
        {
            "id": "8a741226-e894-48a8-b5c7-873e28387f4d",
            "title": "AI Regulation Bill Passes Senate Committee",
            "content": "The Senate Commerce Committee approved landmark legislation today.",
            "summary": null,
            "url": "https://www.bbc.com/news/technology-ai-regulation-2025",
            "published_at": "2025-10-26T09:02:26.3+00:00",
            "news_sources": { "id": "0d9c1c52-8a3e-4c61-9a52-3b8e1f3b7a01", "name": "BBC" }
        },
        {
            "id": "44383d58-4b3f-4602-9de7-75cd908c7677",
            "title": "Federal Reserve Holds Interest Rates Steady",
            "content": "The Federal Reserve announced it will maintain current interest rates.",
            "summary": null,
            "url": "https://www.reuters.com/markets/fed-rates-2025",
            "published_at": "2025-10-26T08:02:26.3+00:00",
            "news_sources": { "id": "0d9c1c52-8a3e-4c61-9a52-3b8e1f3b7a02", "name": "Reuters" }
        },
        {
            "id": "595bde19-e83b-4c37-a14c-dec76555867a",
            "title": "Bipartisan Infrastructure Projects Break Ground Nationwide",
            "content": null,
            "summary": "Construction began today on dozens of infrastructure projects.",
            "url": "https://www.straightarrownews.com/politics/infrastructure-projects-2025",
            "published_at": "2025-10-26T07:02:26.3+00:00",
            "news_sources": { "id": "0d9c1c52-8a3e-4c61-9a52-3b8e1f3b7a03", "name": "Straight Arrow News" }
        },
        {
            "id": "65005dd3-8b4d-4bc7-8ba0-554a68929914",
            "title": "Tech Companies Announce Voluntary AI Safety Commitments",
            "content": "Major technology companies pledged new voluntary safety commitments.",
            "summary": null,
            "url": "https://www.bbc.com/news/technology-ai-safety-2025",
            "published_at": "2025-10-26T06:02:26.3+00:00",
            "news_sources": { "id": "0d9c1c52-8a3e-4c61-9a52-3b8e1f3b7a01", "name": "BBC" }
        },
        {
            "id": "25b233df-81d0-4e54-8e84-7ba4a1dbd23a",
            "title": "Supreme Court Agrees to Hear Social Media Regulation Case",
            "content": "The U.S. Supreme Court will hear arguments on state social media laws.",
            "summary": null,
            "url": "https://www.reuters.com/legal/supreme-court-social-media-2025",
            "published_at": "2025-10-26T05:02:26.3+00:00",
            "news_sources": null
        }
    ])
}

pub fn article_ids(articles: &Value) -> Vec<String> {
    articles
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap().to_string())
        .collect()
}

//=========================================================================================
// Application Under Test
//=========================================================================================

pub struct TestApp {
    pub backend: MockBackend,
    router: Router,
}

impl TestApp {
    /// Starts a backend and wires the real adapters to it. `overrides` are
    /// extra environment values layered over the defaults.
    pub async fn start(
        articles: Value,
        fail: Option<Upstream>,
        overrides: &[(&str, &str)],
    ) -> anyhow::Result<Self> {
        let backend = MockBackend::start(articles, fail).await?;
        let base = backend.base_url();

        let mut vars: HashMap<String, String> = HashMap::from([
            ("BAAS_BASE_URL".to_string(), base.clone()),
            ("BAAS_API_KEY".to_string(), API_KEY.to_string()),
            ("OPENAI_API_KEY".to_string(), "sk-test".to_string()),
            ("OPENAI_BASE_URL".to_string(), format!("{base}/v1")),
            ("ELEVENLABS_API_KEY".to_string(), "xi-test".to_string()),
            ("ELEVENLABS_BASE_URL".to_string(), base),
            ("HTTP_TIMEOUT_SECS".to_string(), "10".to_string()),
        ]);
        for (key, value) in overrides {
            vars.insert(key.to_string(), value.to_string());
        }

        let config = Config::from_lookup(|k| vars.get(k).cloned())?;
        let state = AppState::from_config(Arc::new(config)).await?;
        let router = build_router(Arc::new(state));

        Ok(Self { backend, router })
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        bearer: Option<&str>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let response = self
            .router
            .clone()
            .oneshot(request.body(Body::empty())?)
            .await?;

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    pub async fn trigger(&self) -> anyhow::Result<(StatusCode, Value)> {
        self.send("POST", "/generate-podcast", None).await
    }
}
