//! OpenAI-compatible chat-completion gateway.
//!
//! Sends the composed prompt as a single user message to the
//! `/chat/completions` endpoint. Compatible with any OpenAI-style API
//! (Azure OpenAI, local servers).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::GenerationError;
use crate::domain::models::GenerationConfig;
use crate::domain::ports::AnswerGenerator;

/// Configuration for the chat gateway.
#[derive(Debug, Clone)]
pub struct OpenAiGeneratorConfig {
    /// API key. Falls back to `OPENAI_API_KEY` env var.
    pub api_key: Option<String>,
    /// Base URL for the API.
    pub base_url: String,
    /// Chat model identifier.
    pub model: String,
    /// Maximum tokens to generate per answer.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAiGeneratorConfig {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl OpenAiGeneratorConfig {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            api_key: None,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        }
    }

    /// Explicit key, or the `OPENAI_API_KEY` env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}

/// OpenAI-compatible generation backend.
pub struct OpenAiGenerator {
    config: OpenAiGeneratorConfig,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiGenerator {
    /// Build the gateway, or `None` when no API key is configured anywhere.
    ///
    /// Absence is the signal the pipeline uses for its distinct
    /// no-backend-configured fallback; it is not an error.
    pub fn from_config(config: OpenAiGeneratorConfig) -> Option<Self> {
        let api_key = config.resolve_api_key()?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        Some(Self {
            config,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl AnswerGenerator for OpenAiGenerator {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let request_body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|err| GenerationError::Request(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(GenerationError::Status { status, body });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::MalformedResponse(err.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(GenerationError::EmptyResponse)
    }
}

// -- OpenAI API request/response types --

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator_for(server: &mockito::ServerGuard) -> OpenAiGenerator {
        OpenAiGenerator::from_config(OpenAiGeneratorConfig {
            api_key: Some("test-key".to_string()),
            base_url: server.url(),
            model: "test-model".to_string(),
            max_tokens: 64,
            temperature: 0.1,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn returns_the_first_choice_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(
                r#"{"choices": [{"message": {"role": "assistant", "content": "Plain words."}}]}"#,
            )
            .create_async()
            .await;

        let answer = generator_for(&server).generate("prompt").await.unwrap();
        assert_eq!(answer, "Plain words.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn error_status_carries_the_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = generator_for(&server).generate("prompt").await.unwrap_err();
        match err {
            GenerationError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_are_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let err = generator_for(&server).generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[test]
    fn explicit_api_key_wins_over_environment() {
        let config = OpenAiGeneratorConfig {
            api_key: Some("explicit".to_string()),
            ..OpenAiGeneratorConfig::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("explicit"));
    }
}
