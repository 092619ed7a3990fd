//! services/api/src/adapters/storage.rs
//!
//! Uploads episode audio to a bucket in the backend's object storage.
//! It implements the `ObjectStorage` port from the `core` crate.

use std::sync::Arc;

use async_trait::async_trait;
use podcast_core::{AudioPayload, ObjectStorage, PipelineError, PipelineResult};
use reqwest::{
    multipart::{Form, Part},
    Method,
};
use tracing::debug;

use super::http::{failure_detail, BaasClient};

/// Episodes are always stored as MP3, whatever the speech API reported.
const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

/// Stores objects under `/api/storage/buckets/{bucket}/objects/{name}`.
pub struct BucketStorage {
    baas: Arc<BaasClient>,
    bucket: String,
}

impl BucketStorage {
    pub fn new(baas: Arc<BaasClient>, bucket: String) -> Self {
        Self { baas, bucket }
    }

    fn object_path(&self, object_name: &str) -> String {
        format!("/api/storage/buckets/{}/objects/{}", self.bucket, object_name)
    }

    /// The public address of an object; the same path the upload is sent to.
    pub fn public_url(&self, object_name: &str) -> String {
        format!("{}{}", self.baas.base_url(), self.object_path(object_name))
    }
}

#[async_trait]
impl ObjectStorage for BucketStorage {
    async fn upload_audio(
        &self,
        object_name: &str,
        payload: &AudioPayload,
    ) -> PipelineResult<String> {
        debug!("Uploading {} ({} bytes) to bucket {}", object_name, payload.len(), self.bucket);

        let part = Part::bytes(payload.bytes.to_vec())
            .file_name(object_name.to_string())
            .mime_str(AUDIO_CONTENT_TYPE)
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .baas
            .request(Method::POST, &self.object_path(object_name))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Storage(failure_detail(response).await));
        }

        Ok(self.public_url(object_name))
    }
}
