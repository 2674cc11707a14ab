//! Hosted-inference image embedding adapter.
//!
//! Sends raw image bytes to a hosted feature-extraction model (CLIP-style)
//! and returns the feature vector. Accepts both a flat array and the
//! single-row nested array shape some endpoints return.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::errors::EmbeddingError;
use crate::domain::models::EmbeddingConfig;
use crate::domain::ports::EmbeddingProvider;

/// Configuration for the HTTP embedding provider.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingConfig {
    /// API token. Falls back to `HF_API_TOKEN` env var.
    pub api_token: Option<String>,
    /// Base URL of the inference service.
    pub base_url: String,
    /// Feature-extraction model identifier.
    pub model: String,
    /// Expected embedding dimension.
    pub dimension: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpEmbeddingConfig {
    fn default() -> Self {
        Self::from_config(&EmbeddingConfig::default())
    }
}

impl HttpEmbeddingConfig {
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self {
            api_token: None,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            dimension: config.dimension,
            timeout_secs: config.timeout_secs,
        }
    }

    fn get_api_token(&self) -> Option<String> {
        self.api_token
            .clone()
            .or_else(|| std::env::var("HF_API_TOKEN").ok())
    }
}

/// HTTP image embedding provider.
pub struct HttpEmbeddingProvider {
    config: HttpEmbeddingConfig,
    client: reqwest::Client,
}

impl HttpEmbeddingProvider {
    pub fn new(config: HttpEmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        Self { config, client }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    fn name(&self) -> &'static str {
        "clip-http"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, path: &Path) -> Result<Vec<f32>, EmbeddingError> {
        let image = std::fs::read(path).map_err(|source| EmbeddingError::UnreadableImage {
            path: path.to_path_buf(),
            source,
        })?;

        let url = format!("{}/models/{}", self.config.base_url, self.config.model);
        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/octet-stream")
            .body(image);

        if let Some(token) = self.config.get_api_token() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|err| EmbeddingError::Backend(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(EmbeddingError::Backend(format!("{status}: {body}")));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|err| EmbeddingError::MalformedResponse(err.to_string()))?;

        let vector = match parsed {
            EmbeddingResponse::Flat(vector) => vector,
            EmbeddingResponse::Nested(mut rows) => {
                if rows.is_empty() {
                    return Err(EmbeddingError::MalformedResponse(
                        "empty embedding matrix".to_string(),
                    ));
                }
                rows.swap_remove(0)
            }
        };

        if vector.len() != self.config.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.config.dimension,
                actual: vector.len(),
            });
        }

        Ok(vector)
    }
}

/// Endpoints return either `[f32, ...]` or `[[f32, ...]]` for a single image.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbeddingResponse {
    Flat(Vec<f32>),
    Nested(Vec<Vec<f32>>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_for(server: &mockito::ServerGuard, dimension: usize) -> HttpEmbeddingProvider {
        HttpEmbeddingProvider::new(HttpEmbeddingConfig {
            api_token: Some("test-token".to_string()),
            base_url: server.url(),
            model: "test/embed-model".to_string(),
            dimension,
            timeout_secs: 5,
        })
    }

    fn image_fixture() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"fake image bytes").unwrap();
        file
    }

    #[tokio::test]
    async fn parses_a_flat_vector() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/test/embed-model")
            .with_status(200)
            .with_body("[0.1, 0.2, 0.3]")
            .create_async()
            .await;

        let image = image_fixture();
        let vector = provider_for(&server, 3).embed(image.path()).await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn parses_a_single_row_matrix() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/test/embed-model")
            .with_status(200)
            .with_body("[[0.5, 0.5]]")
            .create_async()
            .await;

        let image = image_fixture();
        let vector = provider_for(&server, 2).embed(image.path()).await.unwrap();
        assert_eq!(vector, vec![0.5, 0.5]);
    }

    #[tokio::test]
    async fn unexpected_dimension_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/test/embed-model")
            .with_status(200)
            .with_body("[0.1, 0.2]")
            .create_async()
            .await;

        let image = image_fixture();
        let err = provider_for(&server, 4)
            .embed(image.path())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::DimensionMismatch {
                expected: 4,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn backend_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/models/test/embed-model")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let image = image_fixture();
        let err = provider_for(&server, 2)
            .embed(image.path())
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Backend(_)));
    }
}
