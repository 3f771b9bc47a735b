//! Core business logic for the authentication system.
//!
//! [`AuthService`] composes the credential store, the password hasher and the
//! token codec into `register` and `login`. It knows nothing about HTTP: the
//! handlers hand it plain request structs and map the returned [`AuthError`].

use anyhow::Context;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use validator::Validate;

use crate::auth::models::*;
use crate::config::Config;
use crate::database::models::NewCredential;
use crate::errors::{AuthError, AuthFailure, AuthResult, StoreError};
use crate::repositories::CredentialStore;
use crate::utils::password::PasswordHasher;
use crate::utils::token::{Claims, TokenCodec};

const DUMMY_PASSWORD: &str = "passgate-timing-equalizer";

/// Tunables of the authentication flow.
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    /// Lifetime of issued tokens
    pub token_ttl: chrono::Duration,
    /// Upper bound on every credential store call
    pub store_timeout: Duration,
    /// Roles accepted at registration; `None` accepts any non-empty role
    pub allowed_roles: Option<Vec<String>>,
}

impl AuthPolicy {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let token_ttl = i64::try_from(config.token_ttl_hours)
            .ok()
            .and_then(chrono::Duration::try_hours)
            .context("TOKEN_TTL_HOURS is too large")?;

        Ok(Self {
            token_ttl,
            store_timeout: Duration::from_millis(config.store_timeout_ms),
            allowed_roles: config.allowed_roles.clone(),
        })
    }
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            token_ttl: chrono::Duration::hours(2),
            store_timeout: Duration::from_secs(5),
            allowed_roles: None,
        }
    }
}

/// Authentication service for registration, login and token checks.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    codec: TokenCodec,
    policy: AuthPolicy,
    /// Hash verified against when the identity is unknown
    dummy_hash: String,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        codec: TokenCodec,
        policy: AuthPolicy,
    ) -> AuthResult<Self> {
        let dummy_hash = hasher.hash(DUMMY_PASSWORD)?;

        Ok(AuthService {
            store,
            hasher,
            codec,
            policy,
            dummy_hash,
        })
    }

    /// Create a credential record and return its id.
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<RegisterResponse> {
        // Validate input
        if let Err(validation_errors) = request.validate() {
            let mut error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_deref().unwrap_or("Invalid value")
                        )
                    })
                })
                .collect();
            error_messages.sort();
            return Err(AuthError::validation(error_messages.join(", ")));
        }

        if let Some(allowed) = &self.policy.allowed_roles {
            if !allowed.iter().any(|role| role == &request.role) {
                return Err(AuthError::validation(format!(
                    "role: Unknown role '{}'",
                    request.role
                )));
            }
        }

        let password_hash = self.hash_password(request.password).await?;

        let credential = NewCredential {
            username: request.username,
            password_hash,
            role: request.role,
        };
        let username = credential.username.clone();
        let store = Arc::clone(&self.store);
        let limit = self.policy.store_timeout;

        // The store owns the timeout for writes. The spawned task outlives
        // this future, so a write that has started always completes.
        let id = tokio::spawn(async move { store.insert_unique(credential, limit).await })
            .await
            .unwrap_or_else(|e| {
                Err(StoreError::Backend(anyhow::anyhow!(
                    "Insert task failed: {}",
                    e
                )))
            })
            .map_err(|e| {
                if !matches!(e, StoreError::Conflict { .. }) {
                    error!(username = %username, error = %e, "Failed to store credential");
                }
                AuthError::from_store(e)
            })?;

        info!(user_id = %id, username = %username, "User registered");

        Ok(RegisterResponse {
            message: "User registered successfully".to_string(),
            id,
        })
    }

    /// Verify a username/password pair and issue a session token.
    pub async fn login(&self, request: LoginRequest) -> AuthResult<LoginResponse> {
        let record = self
            .bounded(self.store.find_by_identity(&request.username))
            .await
            .map_err(|e| {
                error!(username = %request.username, error = %e, "Credential lookup failed");
                AuthError::from_store(e)
            })?;

        let Some(record) = record else {
            // Burn the same bcrypt work as a real check before failing.
            self.verify_password(request.password, self.dummy_hash.clone())
                .await?;
            warn!(username = %request.username, reason = %AuthFailure::UnknownIdentity, "Login failed");
            return Err(AuthError::authentication(AuthFailure::UnknownIdentity));
        };

        if !self
            .verify_password(request.password, record.password_hash.clone())
            .await?
        {
            warn!(username = %record.username, reason = %AuthFailure::BadCredentials, "Login failed");
            return Err(AuthError::authentication(AuthFailure::BadCredentials));
        }

        let token = self
            .codec
            .encode(&record.username, &record.role, self.policy.token_ttl)?;

        info!(user_id = %record.id, username = %record.username, role = %record.role, "User logged in");

        Ok(LoginResponse {
            message: "Login success".to_string(),
            token,
            token_type: "Bearer".to_string(),
            expires_in: u64::try_from(self.policy.token_ttl.num_seconds()).unwrap_or(0),
        })
    }

    /// Validate a presented token and return its claims.
    pub fn authenticate_token(&self, token: &str) -> AuthResult<Claims> {
        self.codec.decode(token)
    }

    /// Runs a read-only store call under the configured timeout.
    async fn bounded<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let limit = self.policy.store_timeout;
        tokio::time::timeout(limit, call)
            .await
            .map_err(|_| StoreError::Timeout(limit))?
    }

    async fn hash_password(&self, password: String) -> AuthResult<String> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::hashing(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, password: String, password_hash: String) -> AuthResult<bool> {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &password_hash))
            .await
            .map_err(|e| AuthError::hashing(format!("Verification task failed: {}", e)))
    }
}
