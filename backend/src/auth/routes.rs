//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle user login, registration and token introspection.
//! They expect an `Extension<Arc<AuthService>>` layer on the enclosing router.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/me", get(me).layer(middleware::from_fn(token_auth)))
}
