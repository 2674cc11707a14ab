pub mod config;
pub mod query;
pub mod severity;
pub mod user;

pub use config::{
    CaptionConfig, Config, DatabaseConfig, EmbeddingConfig, GenerationConfig, IndexConfig,
    LoggingConfig,
};
pub use query::QueryResult;
pub use severity::Severity;
pub use user::UserAccount;
