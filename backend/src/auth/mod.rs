//! Authentication module for credential registration, login and token checks.
//!
//! This module provides the public interface for user authentication: the
//! [`service::AuthService`] orchestrator, its request/response models, and the
//! axum handlers, middleware and routes that expose it over HTTP.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;
