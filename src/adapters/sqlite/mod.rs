//! SQLite adapters for the demo account store.

pub mod connection;
pub mod user_repository;

pub use connection::{create_pool, create_test_pool, ConnectionError};
pub use user_repository::SqliteUserRepository;

use sqlx::SqlitePool;

use crate::domain::errors::StoreError;

/// Run the embedded migrations against `pool`.
pub async fn initialize_database(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
