//! Answer generation gateway port.

use async_trait::async_trait;

use crate::domain::errors::GenerationError;

/// Trait for text generation backends.
///
/// An unconfigured backend (no credential) is modeled by the *absence* of an
/// implementation, not by an erroring one; the pipeline holds an
/// `Option<Arc<dyn AnswerGenerator>>` and treats the two states differently.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Backend name (e.g., "openai", "static").
    fn name(&self) -> &'static str;

    /// Generate an answer for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
