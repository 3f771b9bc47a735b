//! In-memory credential stores for tests.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{CredentialRecord, NewCredential};
use crate::errors::StoreError;
use crate::repositories::CredentialStore;

/// HashMap-backed store; the write lock makes check-and-insert atomic.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    records: RwLock<HashMap<String, CredentialRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count_identity(&self, identity: &str) -> usize {
        self.records
            .read()
            .await
            .values()
            .filter(|record| record.username == identity)
            .count()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_identity(
        &self,
        identity: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        Ok(self.records.read().await.get(identity).cloned())
    }

    async fn insert_unique(
        &self,
        credential: NewCredential,
        timeout: Duration,
    ) -> Result<String, StoreError> {
        let mut records = tokio::time::timeout(timeout, self.records.write())
            .await
            .map_err(|_| StoreError::Timeout(timeout))?;
        if records.contains_key(&credential.username) {
            return Err(StoreError::Conflict {
                identity: credential.username,
            });
        }

        let id = Uuid::now_v7().to_string();
        records.insert(
            credential.username.clone(),
            CredentialRecord {
                id: id.clone(),
                username: credential.username,
                password_hash: credential.password_hash,
                role: credential.role,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }
}

/// Store whose every call fails or stalls, counting the attempts.
pub struct FaultyCredentialStore {
    pub stall: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FaultyCredentialStore {
    /// Fails immediately with a backend error.
    pub fn failing() -> Self {
        Self {
            stall: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Sleeps for `stall` before failing, to trip caller timeouts.
    pub fn stalling(stall: Duration) -> Self {
        Self {
            stall: Some(stall),
            calls: AtomicUsize::new(0),
        }
    }

    async fn fail<T>(&self) -> Result<T, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }
        Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
    }

    /// Like `fail`, but a stall longer than `timeout` reports a timeout.
    async fn fail_within<T>(&self, timeout: Duration) -> Result<T, StoreError> {
        tokio::time::timeout(timeout, self.fail())
            .await
            .map_err(|_| StoreError::Timeout(timeout))?
    }
}

#[async_trait]
impl CredentialStore for FaultyCredentialStore {
    async fn find_by_identity(
        &self,
        _identity: &str,
    ) -> Result<Option<CredentialRecord>, StoreError> {
        self.fail().await
    }

    async fn insert_unique(
        &self,
        _credential: NewCredential,
        timeout: Duration,
    ) -> Result<String, StoreError> {
        self.fail_within(timeout).await
    }
}
