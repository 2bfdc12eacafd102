//! Server configuration, read from the environment once at startup.

use std::env;
use std::str::FromStr;

/// Runtime settings for the stage API server.
///
/// Everything except `DATABASE_URL` has a local-development default; a
/// misconfigured server refuses to start rather than running half-wired.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address, `HOST` (default `0.0.0.0`).
    pub host: String,
    /// Bind port, `PORT` (default `3000`).
    pub port: u16,
    /// Postgres connection string, `DATABASE_URL` (required).
    pub database_url: String,
    /// Allowed CORS origins for the voter and display frontends,
    /// comma-separated `CORS_ORIGINS` (default `http://localhost:5173`).
    pub cors_origins: Vec<String>,
    /// Per-request timeout, `REQUEST_TIMEOUT_SECS` (default `30`).
    pub request_timeout_secs: u64,
    /// Budget for draining background tasks on shutdown,
    /// `SHUTDOWN_TIMEOUT_SECS` (default `30`).
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Load the configuration, panicking on a missing `DATABASE_URL` or
    /// an unparseable numeric value.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: parse_env("PORT", 3000),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            cors_origins: env_or("CORS_ORIGINS", "http://localhost:5173")
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: parse_env("SHUTDOWN_TIMEOUT_SECS", 30),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid number, got '{value}'")),
        Err(_) => default,
    }
}
