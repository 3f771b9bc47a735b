//! Rust structs that represent database table mappings.
//!
//! The password hash must never reach a response body or a log line, so
//! neither struct implements `Serialize` and both redact it in `Debug`.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;

/// A stored credential, as read from the `users` table.
#[derive(Clone, FromRow)]
pub struct CredentialRecord {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Data needed to insert a new credential. The store assigns the id.
#[derive(Clone)]
pub struct NewCredential {
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

impl fmt::Debug for NewCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCredential")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}
