//! MedRAG - retrieval-augmented chest X-ray explanations
//!
//! MedRAG captions an X-ray image, retrieves similar prior cases from a flat
//! vector index, asks a chat model for a plain-language explanation, and
//! softens the answer when a high-severity finding is mentioned.
//!
//! # Architecture
//!
//! This crate follows a ports-and-adapters layout:
//!
//! - **Domain Layer** (`domain`): models, error taxonomy, collaborator ports
//! - **Service Layer** (`services`): the RAG pipeline, the severity gate, the
//!   account service
//! - **Adapters** (`adapters`): hosted-inference captioner and embedder, the
//!   flat index, the chat gateway, SQLite persistence, and mocks for tests
//! - **Infrastructure** (`infrastructure`): configuration loading
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use medrag::services::RagPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Wire adapters once, then query per image.
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{
    CaptionError, EmbeddingError, GenerationError, IndexError, QueryError, StoreError,
};
pub use domain::models::{Config, QueryResult, Severity, UserAccount};
pub use domain::ports::{
    AnswerGenerator, Captioner, EmbeddingProvider, SearchHit, SimilarityIndex, UserRepository,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AccountService, RagPipeline};
