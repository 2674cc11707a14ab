//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interfaces adapters must implement:
//! - `Captioner`: image to natural-language caption
//! - `EmbeddingProvider`: image to fixed-length feature vector
//! - `SimilarityIndex`: nearest-neighbor lookup over known cases
//! - `AnswerGenerator`: prompt to generated answer text
//! - `UserRepository`: demo account persistence
//!
//! These traits define the contracts that allow the pipeline to be
//! independent of specific model backends and storage.

pub mod captioner;
pub mod embedding;
pub mod generator;
pub mod index;
pub mod user_repository;

pub use captioner::Captioner;
pub use embedding::EmbeddingProvider;
pub use generator::AnswerGenerator;
pub use index::{SearchHit, SimilarityIndex};
pub use user_repository::UserRepository;
