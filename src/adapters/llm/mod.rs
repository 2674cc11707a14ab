//! Answer generation adapters.

pub mod openai;

pub use openai::{OpenAiGenerator, OpenAiGeneratorConfig};
