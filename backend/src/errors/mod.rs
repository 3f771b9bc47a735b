//! Global application error types.
//!
//! This module defines the error kinds produced by the authentication core and
//! by the credential store gateway. Every failure of `login`/`register` ends up
//! as exactly one [`AuthError`]; the transport layer maps it to a response in
//! `api::common`.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a credential store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same identity already exists.
    #[error("record already exists: {identity}")]
    Conflict { identity: String },

    /// The store did not answer within the allotted time.
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Any other backend failure (connection, query, decoding).
    #[error("store backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Internal reason behind an authentication failure.
///
/// Both reasons are reported identically to callers outside the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    UnknownIdentity,
    BadCredentials,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthFailure::UnknownIdentity => write!(f, "identity not found"),
            AuthFailure::BadCredentials => write!(f, "bad credentials"),
        }
    }
}

/// Error kinds of the authentication core.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Identity already exists: {identity}")]
    DuplicateIdentity { identity: String },

    #[error("Authentication failed: {reason}")]
    Authentication { reason: AuthFailure },

    #[error("Password hashing failed: {message}")]
    Hashing { message: String },

    #[error("Token issuance failed: {message}")]
    TokenIssuance { message: String },

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Storage error: {source}")]
    Storage {
        #[from]
        source: StoreError,
    },
}

pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn duplicate_identity(identity: impl Into<String>) -> Self {
        Self::DuplicateIdentity {
            identity: identity.into(),
        }
    }

    pub fn authentication(reason: AuthFailure) -> Self {
        Self::Authentication { reason }
    }

    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }

    pub fn token_issuance(message: impl Into<String>) -> Self {
        Self::TokenIssuance {
            message: message.into(),
        }
    }

    /// Maps a store failure, turning an insert conflict into
    /// `DuplicateIdentity`.
    pub fn from_store(error: StoreError) -> Self {
        match error {
            StoreError::Conflict { identity } => Self::duplicate_identity(identity),
            other => Self::Storage { source: other },
        }
    }
}
