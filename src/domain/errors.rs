//! Domain errors for the MedRAG pipeline.
//!
//! Each collaborator class gets its own error type so the pipeline can catch
//! failures at the call site and degrade that stage only. The sole error that
//! escapes a query is [`QueryError`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the caption provider.
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("unreadable image {path}: {source}")]
    UnreadableImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("caption backend request failed: {0}")]
    Backend(String),

    #[error("caption backend returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("caption backend returned no caption")]
    EmptyResponse,
}

/// Errors from the embedding provider.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("unreadable image {path}: {source}")]
    UnreadableImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("embedding backend request failed: {0}")]
    Backend(String),

    #[error("embedding backend returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("embedding has dimension {actual}, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors from the similarity index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index file not found at {0}")]
    Missing(PathBuf),

    #[error("failed to read index: {0}")]
    Io(#[from] std::io::Error),

    #[error("index file is malformed: {0}")]
    Malformed(String),

    #[error("index contains no vectors")]
    Empty,

    #[error("query vector has dimension {actual}, index expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("index unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the answer generation gateway.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(String),

    #[error("generation backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generation backend returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("generation backend returned no choices")]
    EmptyResponse,
}

/// The only error a pipeline query surfaces to its caller.
///
/// Collaborator failures never appear here; they degrade the corresponding
/// field of the result instead.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("invalid neighbor count {0}: must be at least 1")]
    InvalidNeighborCount(usize),
}

/// Errors from the account store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("migration failed: {0}")]
    Migration(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Migration(err.to_string())
    }
}
