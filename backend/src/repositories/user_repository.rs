//! Database repository for credential records.
//!
//! SQLite-backed [`CredentialStore`]. Uniqueness of `username` is enforced by
//! the table's `UNIQUE` constraint, so concurrent registrations of the same
//! identity resolve inside the database.

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::time::Duration;
use uuid::Uuid;

use crate::database::models::{CredentialRecord, NewCredential};
use crate::errors::StoreError;
use crate::repositories::CredentialStore;

/// Repository for user credential operations.
#[derive(Clone)]
pub struct UserRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool with the `users` table migrated
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Retrieves a credential by username.
    ///
    /// # Returns
    /// `Some(CredentialRecord)` if found, `None` otherwise
    pub async fn get_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        let user = sqlx::query_as::<_, CredentialRecord>(
            r#"
            SELECT id, username, password_hash, role, created_at
            FROM users WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.into()))?;

        Ok(user)
    }

    /// Creates a new credential row.
    ///
    /// `timeout` applies to obtaining a connection and opening the
    /// transaction. The INSERT and COMMIT are not raced against it: a
    /// transaction dropped mid-commit may still land, so a timeout is only
    /// reported while nothing has been written.
    ///
    /// # Errors
    /// `StoreError::Conflict` if the username is taken,
    /// `StoreError::Timeout` if the transaction could not be opened in time.
    pub async fn create_user(
        &self,
        credential: NewCredential,
        timeout: Duration,
    ) -> Result<String, StoreError> {
        let id = Uuid::now_v7().to_string();

        let mut tx = match tokio::time::timeout(timeout, self.pool.begin()).await {
            Ok(Ok(tx)) => tx,
            Ok(Err(sqlx::Error::PoolTimedOut)) | Err(_) => {
                return Err(StoreError::Timeout(timeout));
            }
            Ok(Err(e)) => return Err(StoreError::Backend(e.into())),
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&credential.username)
        .bind(&credential.password_hash)
        .bind(&credential.role)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(result) if result.rows_affected() == 1 => {}
            Ok(result) => {
                return Err(StoreError::Backend(anyhow!(
                    "insert affected {} rows",
                    result.rows_affected()
                )));
            }
            Err(e) if is_unique_violation(&e) => {
                return Err(StoreError::Conflict {
                    identity: credential.username,
                });
            }
            Err(e) => return Err(StoreError::Backend(e.into())),
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.into()))?;

        Ok(id)
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .is_some_and(|db_error| db_error.is_unique_violation())
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn find_by_identity(
        &self,
        identity: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        self.get_user_by_username(identity).await
    }

    async fn insert_unique(
        &self,
        credential: NewCredential,
        timeout: Duration,
    ) -> Result<String, StoreError> {
        self.create_user(credential, timeout).await
    }
}
