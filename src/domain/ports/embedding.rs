//! Embedding provider port for image feature vectors.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::EmbeddingError;

/// Trait for embedding providers that convert an image into a fixed-length
/// feature vector for similarity comparison.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g., "clip-http", "static").
    fn name(&self) -> &'static str;

    /// Embedding dimension for this provider/model.
    fn dimension(&self) -> usize;

    /// Generate a feature vector for the image at `path`.
    ///
    /// The returned vector always has exactly [`dimension`](Self::dimension)
    /// elements; implementations reject anything else with
    /// [`EmbeddingError::DimensionMismatch`].
    async fn embed(&self, path: &Path) -> Result<Vec<f32>, EmbeddingError>;
}
