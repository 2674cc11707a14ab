//! Hosted-inference adapters for the caption and embedding providers.

pub mod captioner;
pub mod embedding;

pub use captioner::{HttpCaptioner, HttpCaptionerConfig};
pub use embedding::{HttpEmbeddingConfig, HttpEmbeddingProvider};
