//! Data structures for authentication requests and responses.

use serde::{Deserialize, Serialize};
use validator::Validate;

// Absent fields deserialize as empty strings, so they reach validation (or an
// unknown-identity login) instead of failing in the JSON extractor.

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Registration request payload
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
}

/// Login response carrying the session token
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub token_type: String,
    pub expires_in: u64, // Token lifetime in seconds
}

/// Registration response carrying the new record id
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub id: String,
}

/// Identity and role of an authenticated request
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfo {
    pub subject: String,
    pub role: String,
    pub issued_at: i64,
    pub expires_at: i64,
}
