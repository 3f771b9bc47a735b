//! Main entry point for the passgate backend.
//!
//! This file initializes the Axum web server, sets up the database connection,
//! builds the authentication service from configuration and registers the
//! auth routes.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod utils;

use anyhow::Context;
use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use database::Database;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info};

use crate::auth::service::{AuthPolicy, AuthService};
use crate::repositories::CredentialStore;
use crate::repositories::user_repository::UserRepository;
use crate::utils::crypto::SecretKey;
use crate::utils::password::PasswordHasher;
use crate::utils::token::TokenCodec;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "passgate=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!(?config, "Configuration loaded");

    let db = Database::new(&config).await?;
    db.migrate().await?;

    let key = SecretKey::from_config(&config.token_secret).context("TOKEN_SECRET is unusable")?;
    let codec = TokenCodec::new(&key, config.token_scheme);
    let scheme = codec.scheme();

    let store: Arc<dyn CredentialStore> = Arc::new(UserRepository::new(db.pool().clone()));
    let auth_service = AuthService::new(
        store,
        PasswordHasher::new(config.bcrypt_cost),
        codec,
        AuthPolicy::from_config(&config)?,
    )
    .context("Failed to initialise authentication service")?;

    let app = Router::new()
        .route("/", get(root_handler))
        .nest("/auth", auth::routes::auth_router())
        .layer(Extension(Arc::new(auth_service)));

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    info!(
        scheme = %scheme,
        "Starting passgate server on port {}", config.server_port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    db.close().await;
    Ok(())
}

async fn root_handler() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Welcome to passgate",
        "data": {
            "service": "passgate",
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
