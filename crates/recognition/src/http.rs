//! HTTP implementation of [`RecognitionProvider`] for a collection-scoped
//! REST face service.
//!
//! Endpoint layout (relative to the configured base URL):
//!
//! - `POST   /v1/collections/{collection}/detect`
//! - `POST   /v1/collections/{collection}/search`
//! - `POST   /v1/collections/{collection}/templates`   (index one face)
//! - `DELETE /v1/collections/{collection}/templates`
//! - `GET    /v1/collections/{collection}/templates`
//!
//! Images travel as multipart form parts; everything else is JSON.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::error::ProviderError;
use crate::provider::RecognitionProvider;
use crate::types::{IndexedTemplate, RemoteFace, TemplateMatch};

/// Connection settings for the recognition service.
#[derive(Debug, Clone)]
pub struct RecognitionServiceConfig {
    /// Base URL, e.g. `http://recognition:8080`.
    pub base_url: String,
    /// Name of the template collection this deployment searches and indexes.
    pub collection_id: String,
    /// Optional API key sent as `x-api-key`.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl RecognitionServiceConfig {
    /// Load from environment variables.
    ///
    /// | Env Var                         | Default                  |
    /// |---------------------------------|--------------------------|
    /// | `RECOGNITION_BASE_URL`          | `http://localhost:8480`  |
    /// | `RECOGNITION_COLLECTION_ID`     | `default`                |
    /// | `RECOGNITION_API_KEY`           | unset                    |
    /// | `RECOGNITION_TIMEOUT_SECS`      | `30`                     |
    pub fn from_env() -> Self {
        let base_url = std::env::var("RECOGNITION_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8480".into());
        let collection_id =
            std::env::var("RECOGNITION_COLLECTION_ID").unwrap_or_else(|_| "default".into());
        let api_key = std::env::var("RECOGNITION_API_KEY").ok();
        let request_timeout: u64 = std::env::var("RECOGNITION_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("RECOGNITION_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url,
            collection_id,
            api_key,
            request_timeout: Duration::from_secs(request_timeout),
        }
    }
}

/// Production [`RecognitionProvider`] backed by reqwest.
pub struct HttpRecognitionClient {
    http: reqwest::Client,
    config: RecognitionServiceConfig,
}

impl HttpRecognitionClient {
    pub fn new(config: RecognitionServiceConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to build HTTP client");
        Self { http, config }
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!(
            "{}/v1/collections/{}/{suffix}",
            self.config.base_url.trim_end_matches('/'),
            self.config.collection_id,
        )
    }

    fn image_part(image: &[u8]) -> Part {
        Part::bytes(image.to_vec())
            .file_name("image")
            .mime_str("application/octet-stream")
            .expect("static MIME type is always valid")
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }

    /// Turn a non-success response into a classified [`ProviderError`].
    async fn classify_failure(response: Response) -> ProviderError {
        let status = response.status();
        let body: ApiErrorBody = response.json().await.unwrap_or_default();
        let message = if body.message.is_empty() {
            status.to_string()
        } else {
            body.message
        };

        if status == StatusCode::TOO_MANY_REQUESTS {
            return ProviderError::RateLimited(message);
        }
        match body.code.as_str() {
            "invalid_image" | "unsupported_format" => ProviderError::InvalidImage(message),
            "quota_exceeded" => ProviderError::QuotaExceeded(message),
            _ => ProviderError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: Response,
    ) -> Result<T, ProviderError> {
        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl RecognitionProvider for HttpRecognitionClient {
    async fn detect(&self, image: &[u8]) -> Result<Vec<RemoteFace>, ProviderError> {
        let form = Form::new().part("image", Self::image_part(image));
        let response = self
            .apply_auth(self.http.post(self.collection_url("detect")))
            .multipart(form)
            .send()
            .await?;

        let body: DetectResponse = Self::parse_json(response).await?;
        for face in &body.faces {
            face.validate()
                .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        }
        tracing::debug!(face_count = body.faces.len(), "Detection call completed");
        Ok(body.faces)
    }

    async fn search(
        &self,
        image: &[u8],
        min_similarity: f64,
        max_results: u32,
    ) -> Result<Vec<TemplateMatch>, ProviderError> {
        let form = Form::new()
            .part("image", Self::image_part(image))
            .text("min_similarity", min_similarity.to_string())
            .text("max_results", max_results.to_string());
        let response = self
            .apply_auth(self.http.post(self.collection_url("search")))
            .multipart(form)
            .send()
            .await?;

        let body: SearchResponse = Self::parse_json(response).await?;
        for template_match in &body.matches {
            template_match
                .validate()
                .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        }
        tracing::debug!(match_count = body.matches.len(), "Search call completed");
        Ok(body.matches)
    }

    async fn index_face(
        &self,
        image: &[u8],
        external_id: &str,
    ) -> Result<IndexedTemplate, ProviderError> {
        let form = Form::new()
            .part("image", Self::image_part(image))
            .text("external_id", external_id.to_string());
        let response = self
            .apply_auth(self.http.post(self.collection_url("templates")))
            .multipart(form)
            .send()
            .await?;

        let indexed: IndexedTemplate = Self::parse_json(response).await?;
        if indexed.template_id.is_empty() {
            return Err(ProviderError::MalformedResponse(
                "Index response carries an empty template id".into(),
            ));
        }
        tracing::debug!(template_id = %indexed.template_id, "Face indexed");
        Ok(indexed)
    }

    async fn delete_templates(
        &self,
        template_ids: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        let response = self
            .apply_auth(self.http.delete(self.collection_url("templates")))
            .json(&serde_json::json!({ "template_ids": template_ids }))
            .send()
            .await?;

        let body: DeleteResponse = Self::parse_json(response).await?;
        tracing::debug!(
            requested = template_ids.len(),
            deleted = body.deleted.len(),
            "Template deletion completed",
        );
        Ok(body.deleted)
    }

    async fn list_templates(&self) -> Result<Vec<String>, ProviderError> {
        let response = self
            .apply_auth(self.http.get(self.collection_url("templates")))
            .send()
            .await?;

        let body: ListResponse = Self::parse_json(response).await?;
        Ok(body.template_ids)
    }
}

// ---------------------------------------------------------------------------
// Wire envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DetectResponse {
    faces: Vec<RemoteFace>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    matches: Vec<TemplateMatch>,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    deleted: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    template_ids: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}
