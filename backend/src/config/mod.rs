//! Central module for application-wide configuration settings.
//!
//! This module handles loading and managing configuration parameters such as
//! the database URL, server port, the token secret and the token/password
//! policies. A missing or malformed token secret aborts startup.

use anyhow::{Context, Result, bail};
use std::env;
use std::fmt;
use std::str::FromStr;

use crate::utils::token::TokenScheme;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub token_secret: String,
    pub token_scheme: TokenScheme,
    pub token_ttl_hours: u64,
    pub bcrypt_cost: u32,
    pub store_timeout_ms: u64,
    pub allowed_roles: Option<Vec<String>>,
    pub server_port: u16,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL not set")?;

        let max_connections = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5u32)?;
        let acquire_timeout_seconds = parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECONDS", 3u64)?;

        let token_secret = lookup("TOKEN_SECRET")
            .filter(|secret| !secret.is_empty())
            .context("TOKEN_SECRET not set")?;

        let token_scheme = parse_or(&lookup, "TOKEN_SCHEME", TokenScheme::Encrypted)?;

        let token_ttl_hours = parse_or(&lookup, "TOKEN_TTL_HOURS", 2u64)?;
        if token_ttl_hours == 0 {
            bail!("TOKEN_TTL_HOURS must be greater than zero");
        }

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            bail!("BCRYPT_COST must be between 4 and 31");
        }

        let store_timeout_ms = parse_or(&lookup, "STORE_TIMEOUT_MS", 5000u64)?;

        let allowed_roles = lookup("ALLOWED_ROLES")
            .map(|raw| {
                raw.split(',')
                    .map(|role| role.trim().to_string())
                    .filter(|role| !role.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|roles| !roles.is_empty());

        let server_port = parse_or(&lookup, "SERVER_PORT", 3000u16)?;

        Ok(Config {
            database_url,
            max_connections,
            acquire_timeout_seconds,
            token_secret,
            token_scheme,
            token_ttl_hours,
            bcrypt_cost,
            store_timeout_ms,
            allowed_roles,
            server_port,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_seconds", &self.acquire_timeout_seconds)
            .field("token_secret", &"<redacted>")
            .field("token_scheme", &self.token_scheme)
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("store_timeout_ms", &self.store_timeout_ms)
            .field("allowed_roles", &self.allowed_roles)
            .field("server_port", &self.server_port)
            .finish()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
        None => Ok(default),
    }
}
