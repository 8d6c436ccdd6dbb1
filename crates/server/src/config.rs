// Application configuration
// Decision: Read once at boot from the environment (plus `.env` via dotenvy in main);
// nothing reads env vars after startup

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;

use crate::auth::AuthConfig;
use crate::uploads::S3Config;

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Mount point for every route except /health (e.g. "/api"); empty = root
    pub api_prefix: String,
    /// Origins allowed to make credentialed cross-origin requests
    pub cors_origins: Vec<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 9000)),
            api_prefix: String::new(),
            cors_origins: Vec::new(),
        }
    }
}

/// Normalize an API prefix to "" or "/segment[/segment]" without a trailing slash
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// Parse a comma-separated origin list, dropping entries that are not valid header values
pub fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = match std::env::var("BIND_ADDR") {
            Ok(addr) if !addr.trim().is_empty() => {
                addr.trim().parse().context("Invalid BIND_ADDR")?
            }
            _ => ServerConfig::default().bind_addr,
        };

        Ok(Self {
            bind_addr,
            api_prefix: normalize_prefix(&std::env::var("API_PREFIX").unwrap_or_default()),
            cors_origins: parse_origins(&std::env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default()),
        })
    }
}

/// Everything the server needs to boot
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    /// None = object storage disabled, signing requests fail with 500
    pub storage: Option<S3Config>,
    /// None = in-memory storage backend
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            storage: S3Config::from_env()?,
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        })
    }
}
