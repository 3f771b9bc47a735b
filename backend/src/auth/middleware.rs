//! Middleware for protecting authenticated routes.
//!
//! Validates the bearer token with the shared [`AuthService`] and stores the
//! decoded [`Claims`](crate::utils::token::Claims) in the request extensions.

use crate::api::common::auth_error_to_http;
use crate::auth::service::AuthService;
use crate::errors::AuthError;
use axum::{
    extract::{Extension, Request},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Bearer token authentication middleware
pub async fn token_auth(
    Extension(auth_service): Extension<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    // Extract Authorization header
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| auth_error_to_http(AuthError::InvalidToken))?;

    match auth_service.authenticate_token(token) {
        Ok(claims) => {
            // Add claims to request extensions for use in handlers
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(error) => {
            tracing::debug!("Rejected bearer token: {}", error);
            Err(auth_error_to_http(error))
        }
    }
}
