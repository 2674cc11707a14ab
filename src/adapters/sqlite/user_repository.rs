//! SQLite-backed user repository for the demo account store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::domain::errors::StoreError;
use crate::domain::models::UserAccount;
use crate::domain::ports::UserRepository;

/// User persistence over a SQLite pool.
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        let created_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(email)
        .bind(password_hash)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(Some(UserAccount {
                id: done.last_insert_rowid(),
                email: email.to_string(),
                created_at,
            })),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_credentials(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        let row = sqlx::query(
            "SELECT id, email, created_at FROM users WHERE email = ? AND password_hash = ?",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<UserAccount, sqlx::Error> {
            let created_at: String = row.try_get("created_at")?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
                .with_timezone(&Utc);

            Ok(UserAccount {
                id: row.try_get("id")?,
                email: row.try_get("email")?,
                created_at,
            })
        })
        .transpose()
        .map_err(StoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_test_pool, initialize_database};

    async fn repository() -> SqliteUserRepository {
        let pool = create_test_pool().await.unwrap();
        initialize_database(&pool).await.unwrap();
        SqliteUserRepository::new(pool)
    }

    #[tokio::test]
    async fn insert_and_find_round_trip() {
        let repo = repository().await;

        let created = repo.insert("test@example.com", "digest").await.unwrap();
        let created = created.expect("first insert succeeds");
        assert_eq!(created.email, "test@example.com");

        let found = repo
            .find_by_credentials("test@example.com", "digest")
            .await
            .unwrap();
        assert_eq!(found.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn wrong_digest_finds_nothing() {
        let repo = repository().await;
        repo.insert("test@example.com", "digest").await.unwrap();

        let found = repo
            .find_by_credentials("test@example.com", "other-digest")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_returns_none() {
        let repo = repository().await;
        repo.insert("test@example.com", "digest").await.unwrap();

        let duplicate = repo.insert("test@example.com", "digest2").await.unwrap();
        assert!(duplicate.is_none());
    }
}
