//! Handler functions for authentication-related API endpoints.
//!
//! These functions parse request data and hand it to `auth::service`; every
//! failure goes through `auth_error_to_http`.

use crate::api::common::auth_error_to_http;
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::errors::AuthError;
use crate::utils::token::Claims;
use axum::{
    extract::{Extension, Json, rejection::JsonRejection},
    http::StatusCode,
    response::Json as ResponseJson,
};
use std::sync::Arc;

/// Handle user login request
#[axum::debug_handler]
pub async fn login(
    Extension(auth_service): Extension<Arc<AuthService>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ResponseJson<LoginResponse>, (StatusCode, String)> {
    let Json(payload) = payload.map_err(invalid_body)?;

    match auth_service.login(payload).await {
        Ok(response) => Ok(ResponseJson(response)),
        Err(error) => Err(auth_error_to_http(error)),
    }
}

/// Handle user registration request
#[axum::debug_handler]
pub async fn register(
    Extension(auth_service): Extension<Arc<AuthService>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, ResponseJson<RegisterResponse>), (StatusCode, String)> {
    let Json(payload) = payload.map_err(invalid_body)?;

    match auth_service.register(payload).await {
        Ok(response) => Ok((StatusCode::CREATED, ResponseJson(response))),
        Err(error) => Err(auth_error_to_http(error)),
    }
}

/// Get the identity carried by the presented token
#[axum::debug_handler]
pub async fn me(
    Extension(claims): Extension<Claims>,
) -> Result<ResponseJson<SessionInfo>, (StatusCode, String)> {
    Ok(ResponseJson(SessionInfo {
        subject: claims.subject().to_string(),
        role: claims.role().to_string(),
        issued_at: claims.iat,
        expires_at: claims.exp,
    }))
}

/// Malformed JSON gets the standard validation envelope
fn invalid_body(rejection: JsonRejection) -> (StatusCode, String) {
    auth_error_to_http(AuthError::validation(format!(
        "Invalid body: {}",
        rejection.body_text()
    )))
}
