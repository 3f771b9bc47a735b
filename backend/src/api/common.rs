//! Error handling utilities for API responses.
//!
//! Converts authentication errors into the standard JSON error envelope.
//!
//! # Response Format
//! All errors return consistent JSON responses containing:
//! - `message`: Human-readable message
//! - `error.error_type`: Machine-readable error category
//!
//! Unknown identities and wrong passwords produce byte-identical bodies apart
//! from the timestamp; the internal reason only reaches the logs.

use crate::errors::{AuthError, StoreError};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

/// Standard API error envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Always `false` for error bodies
    pub success: bool,
    /// Human-readable message
    pub message: String,
    /// Error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Response timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
}

impl ApiResponse {
    /// Create an error response
    pub fn error(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Converts AuthError to appropriate HTTP response with standard format
pub fn auth_error_to_http(error: AuthError) -> (StatusCode, String) {
    let (status, error_type, message) = match error {
        AuthError::Validation { message } => {
            (StatusCode::BAD_REQUEST, "validation_error", message)
        }
        AuthError::DuplicateIdentity { .. } => (
            StatusCode::CONFLICT,
            "already_exists",
            "Username already exists".to_string(),
        ),
        AuthError::Authentication { .. } => (
            StatusCode::UNAUTHORIZED,
            "authentication_failed",
            "Invalid username or password".to_string(),
        ),
        AuthError::InvalidToken => (
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Invalid token".to_string(),
        ),
        AuthError::ExpiredToken => (
            StatusCode::UNAUTHORIZED,
            "token_expired",
            "Token expired".to_string(),
        ),
        AuthError::Storage {
            source: StoreError::Timeout(limit),
        } => {
            tracing::error!("Credential store timed out after {:?}", limit);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "storage_unavailable",
                "Service temporarily unavailable".to_string(),
            )
        }
        AuthError::Hashing { .. } | AuthError::TokenIssuance { .. } | AuthError::Storage { .. } => {
            tracing::error!("Internal error: {}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            )
        }
    };

    let error_response = ApiResponse::error(message, error_type);
    (
        status,
        serde_json::to_string(&error_response).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AuthFailure;
    use std::time::Duration;

    fn body(raw: &str) -> serde_json::Value {
        let mut value: serde_json::Value = serde_json::from_str(raw).unwrap();
        value.as_object_mut().unwrap().remove("timestamp");
        value
    }

    #[test]
    fn test_unknown_identity_and_bad_password_look_identical() {
        let (unknown_status, unknown_body) =
            auth_error_to_http(AuthError::authentication(AuthFailure::UnknownIdentity));
        let (bad_status, bad_body) =
            auth_error_to_http(AuthError::authentication(AuthFailure::BadCredentials));

        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, bad_status);
        assert_eq!(body(&unknown_body), body(&bad_body));
        assert!(!unknown_body.contains("not found"));
        assert!(!bad_body.contains("bad credentials"));
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AuthError::validation("username: Username is required"), StatusCode::BAD_REQUEST, "validation_error"),
            (AuthError::duplicate_identity("alice"), StatusCode::CONFLICT, "already_exists"),
            (AuthError::InvalidToken, StatusCode::UNAUTHORIZED, "invalid_token"),
            (AuthError::ExpiredToken, StatusCode::UNAUTHORIZED, "token_expired"),
            (AuthError::hashing("bad cost"), StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            (AuthError::token_issuance("ttl"), StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            (
                AuthError::from_store(StoreError::Timeout(Duration::from_millis(5))),
                StatusCode::SERVICE_UNAVAILABLE,
                "storage_unavailable",
            ),
            (
                AuthError::from_store(StoreError::Backend(anyhow::anyhow!("disk I/O error"))),
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
            ),
        ];

        for (error, expected_status, expected_type) in cases {
            let (status, raw) = auth_error_to_http(error);
            let value = body(&raw);
            assert_eq!(status, expected_status);
            assert_eq!(value["success"], false);
            assert_eq!(value["error"]["error_type"], expected_type);
        }
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let (_, raw) = auth_error_to_http(AuthError::from_store(StoreError::Backend(
            anyhow::anyhow!("disk I/O error at /var/lib/passgate.db"),
        )));
        assert!(!raw.contains("disk"));

        let (_, raw) = auth_error_to_http(AuthError::duplicate_identity("alice"));
        assert_eq!(body(&raw)["message"], "Username already exists");
    }
}
