//! Result shape returned by the RAG query pipeline.

use serde::{Deserialize, Serialize};

/// The structured output of one pipeline query.
///
/// All three fields are always populated. When a stage degrades, its field
/// carries a clearly marked placeholder instead of being omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Natural-language caption of the image, or a `[Captioning failed: ..]`
    /// placeholder.
    pub caption: String,

    /// Identifiers of the retrieved prior cases, nearest first. Empty when
    /// retrieval degraded.
    pub retrieved: Vec<String>,

    /// The final answer after the severity gate has been applied.
    pub answer: String,
}
