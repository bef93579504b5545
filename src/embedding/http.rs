//! HTTP embedder for OpenAI-compatible `/embeddings` endpoints
//!
//! Works against api.openai.com as well as local services (Ollama, LM Studio,
//! vLLM) that expose the same wire format under a `/v1` prefix.

use super::Embedder;
use crate::llm::BackendError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Default request timeout for embeddings calls
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Largest number of inputs sent in a single request
const MAX_BATCH_SIZE: usize = 100;

/// Embeddings client for OpenAI-compatible endpoints
///
/// # Configuration
///
/// - **base_url**: endpoint prefix including the version segment
///   (e.g. "https://api.openai.com/v1" or "http://localhost:11434/v1")
/// - **model**: embeddings model name (e.g. "text-embedding-3-small")
/// - **dimensions**: requested vector dimensionality
///
/// The API key is read from `OPENAI_API_KEY`; local services that ignore
/// authentication still receive a placeholder bearer token.
pub struct HttpEmbedder {
    base_url: String,
    model: String,
    dimensions: usize,
    http_client: Client,
    timeout: Duration,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl HttpEmbedder {
    /// Creates an embedder with the default timeout.
    pub fn new(base_url: String, model: String, dimensions: usize) -> Self {
        Self::with_timeout(
            base_url,
            model,
            dimensions,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Creates an embedder with a custom timeout.
    pub fn with_timeout(
        base_url: String,
        model: String,
        dimensions: usize,
        timeout: Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            dimensions,
            http_client,
            timeout,
            api_key: std::env::var("OPENAI_API_KEY").ok(),
        }
    }

    /// Overrides the API key read from the environment.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Checks whether the embeddings service answers on its models endpoint.
    ///
    /// Returns `Ok(true)` when the service responds successfully, `Ok(false)`
    /// when it is unreachable or unhealthy.
    pub async fn health_check(&self) -> Result<bool, BackendError> {
        let url = format!("{}/models", self.base_url);

        debug!("Checking embeddings service health at {}", url);

        match self.authorized(self.http_client.get(&url)).send().await {
            Ok(response) => {
                let is_healthy = response.status().is_success();
                if is_healthy {
                    info!("Embeddings service health check successful");
                } else {
                    warn!(
                        "Embeddings service health check failed with status: {}",
                        response.status()
                    );
                }
                Ok(is_healthy)
            }
            Err(e) => {
                if e.is_timeout() || e.is_connect() {
                    warn!("Cannot reach embeddings service at {}", self.base_url);
                    Ok(false)
                } else {
                    error!("Embeddings service health check error: {}", e);
                    Err(BackendError::NetworkError {
                        message: format!("Health check failed: {}", e),
                    })
                }
            }
        }
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.bearer_auth(self.api_key.as_deref().unwrap_or("dummy-api-key"))
    }

    async fn request_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        let url = format!("{}/embeddings", self.base_url);

        let request = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: Some(self.dimensions),
        };

        let response = self
            .authorized(self.http_client.post(&url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!("Embeddings request timed out after {:?}", self.timeout);
                    BackendError::TimeoutError {
                        seconds: self.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    error!("Cannot connect to embeddings service at {}", self.base_url);
                    BackendError::NetworkError {
                        message: format!("Connection failed: {}", e),
                    }
                } else {
                    error!("Embeddings request error: {}", e);
                    BackendError::NetworkError {
                        message: format!("Request failed: {}", e),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            error!("Embeddings API returned error status {}: {}", status, body);

            return Err(BackendError::ApiError {
                message: format!("HTTP {}: {}", status, body),
                status_code: Some(status.as_u16()),
            });
        }

        let api_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!("Failed to parse embeddings response: {}", e);
            BackendError::InvalidResponse {
                message: format!("JSON parse error: {}", e),
                raw_response: None,
            }
        })?;

        // Responses are not guaranteed to preserve input order
        let mut data = api_response.data;
        data.sort_by_key(|d| d.index);

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::InvalidResponse {
                message: "Empty embedding response".to_string(),
                raw_response: None,
            })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, BackendError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(MAX_BATCH_SIZE) {
            all_embeddings.extend(self.request_batch(chunk).await?);
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
