//! Domain layer for the MedRAG pipeline
//!
//! This module contains the domain models, the error taxonomy, and the
//! collaborator ports.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{
    CaptionError, EmbeddingError, GenerationError, IndexError, QueryError, StoreError,
};
