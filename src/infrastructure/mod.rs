//! Infrastructure layer
//!
//! Cross-cutting concerns that are not collaborator adapters themselves,
//! currently configuration loading.

pub mod config;
