//! Credential store gateway.
//!
//! The authentication core only needs two operations from persistence; any
//! store that implements [`CredentialStore`] can back it.

use async_trait::async_trait;
use std::time::Duration;

use crate::database::models::{CredentialRecord, NewCredential};
use crate::errors::StoreError;

pub mod user_repository;

#[cfg(test)]
pub mod memory_store;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks up a credential by its identity. `Ok(None)` means not found.
    async fn find_by_identity(&self, identity: &str)
    -> Result<Option<CredentialRecord>, StoreError>;

    /// Inserts a credential and returns its new id.
    ///
    /// Must fail with [`StoreError::Conflict`] when the identity already
    /// exists, atomically with respect to concurrent inserts.
    ///
    /// `timeout` bounds only the wait before the write is issued (connection,
    /// lock). Once issued, the write runs to completion, so
    /// [`StoreError::Timeout`] means nothing was stored.
    async fn insert_unique(
        &self,
        credential: NewCredential,
        timeout: Duration,
    ) -> Result<String, StoreError>;
}
