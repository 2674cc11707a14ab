//! Service layer: the RAG pipeline, the severity gate, and the account
//! service.

pub mod accounts;
pub mod pipeline;
pub mod severity;

pub use accounts::AccountService;
pub use pipeline::{compose_prompt, RagPipeline};
