//! Similarity index port.

use async_trait::async_trait;

use crate::domain::errors::IndexError;

/// One nearest-neighbor match.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Case identifier resolved from the index sidecar. Positions without a
    /// known identifier carry a synthetic `case_<position>` id instead.
    pub id: String,
    /// Distance from the query vector. Smaller is closer.
    pub distance: f32,
}

/// Trait for nearest-neighbor lookup over a fixed set of embeddings.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    /// Index name (e.g., "flat", "static").
    fn name(&self) -> &'static str;

    /// Vector dimension this index was built with.
    fn dimension(&self) -> usize;

    /// Return up to `k` hits ranked by ascending distance from `vector`.
    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError>;
}
