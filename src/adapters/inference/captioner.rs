//! Hosted-inference caption adapter.
//!
//! Sends the raw image bytes to a hosted image-captioning model (BLIP-style)
//! and returns the generated text. Compatible with the Hugging Face
//! inference API response shape: `[{"generated_text": "..."}]`.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::errors::CaptionError;
use crate::domain::models::CaptionConfig;
use crate::domain::ports::Captioner;

/// Configuration for the HTTP captioner.
#[derive(Debug, Clone)]
pub struct HttpCaptionerConfig {
    /// API token. Falls back to `HF_API_TOKEN` env var; optional because
    /// public endpoints accept anonymous requests.
    pub api_token: Option<String>,
    /// Base URL of the inference service.
    pub base_url: String,
    /// Captioning model identifier.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HttpCaptionerConfig {
    fn default() -> Self {
        Self::from_config(&CaptionConfig::default())
    }
}

impl HttpCaptionerConfig {
    pub fn from_config(config: &CaptionConfig) -> Self {
        Self {
            api_token: None,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    fn get_api_token(&self) -> Option<String> {
        self.api_token
            .clone()
            .or_else(|| std::env::var("HF_API_TOKEN").ok())
    }
}

/// HTTP caption provider.
pub struct HttpCaptioner {
    config: HttpCaptionerConfig,
    client: reqwest::Client,
}

impl HttpCaptioner {
    pub fn new(config: HttpCaptionerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        Self { config, client }
    }
}

#[async_trait]
impl Captioner for HttpCaptioner {
    fn name(&self) -> &'static str {
        "blip-http"
    }

    async fn caption(&self, path: &Path) -> Result<String, CaptionError> {
        let image = std::fs::read(path).map_err(|source| CaptionError::UnreadableImage {
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
            .map_err(|err| CaptionError::Backend(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(CaptionError::Backend(format!("{status}: {body}")));
        }

        let results: Vec<CaptionResponse> = response
            .json()
            .await
            .map_err(|err| CaptionError::MalformedResponse(err.to_string()))?;

        results
            .into_iter()
            .next()
            .map(|result| result.generated_text)
            .ok_or(CaptionError::EmptyResponse)
    }
}

#[derive(Debug, Deserialize)]
struct CaptionResponse {
    generated_text: String,
}
