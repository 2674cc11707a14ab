//! Adapters implementing the domain ports against external systems.

pub mod index;
pub mod inference;
pub mod llm;
pub mod mock;
pub mod sqlite;
