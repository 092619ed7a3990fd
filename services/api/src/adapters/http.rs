//! services/api/src/adapters/http.rs
//!
//! The outbound HTTP client shared by every adapter, and the authenticated
//! request builder for the backend-as-a-service REST and storage APIs.

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};

use crate::error::ApiError;

/// Builds the client all adapters reuse so connections are pooled across calls.
pub fn build_http_client(timeout: Duration) -> Result<Client, ApiError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::CONNECTION, header::HeaderValue::from_static("keep-alive"));

    Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
        .build()
        .map_err(|e| ApiError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// Reads a failed response into `"<status> - <body>"` for error messages.
pub async fn failure_detail(response: Response) -> String {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    format!("{} - {}", status.as_u16(), body)
}

/// Authenticated access to the backend's REST database and object storage.
pub struct BaasClient {
    client: Client,
    base_url: String,
    api_key: SecretString,
}

impl BaasClient {
    pub fn new(client: Client, base_url: String, api_key: SecretString) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A request to `{base_url}{path}` carrying the `apikey` and bearer headers.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", key)
            .header(header::AUTHORIZATION, format!("Bearer {}", key))
    }
}
