//! API Configuration Module
//!
//! Bind address, CORS, data locations and upstream credentials, loaded
//! from environment variables with development-friendly defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

/// API configuration for the HTTP layer and service wiring.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    // ========================================================================
    // Bind Configuration
    // ========================================================================
    /// Host to bind (default: 0.0.0.0).
    pub bind_host: String,

    /// Port to bind (default: 3000).
    pub port: u16,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    // ========================================================================
    // Storage Configuration
    // ========================================================================
    /// Directory holding the JSON store documents.
    pub data_dir: PathBuf,

    /// Directory receiving timestamped store backups.
    pub backup_dir: PathBuf,

    /// Interval between backup passes.
    pub snapshot_interval: Duration,

    // ========================================================================
    // Upstream Configuration
    // ========================================================================
    /// OpenRouter API key; empty means unconfigured (requests will fail
    /// with an auth error, the process still starts).
    pub openrouter_api_key: String,

    /// HTTP-Referer forwarded upstream.
    pub referer: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(), // Empty = allow all
            data_dir: PathBuf::from("data"),
            backup_dir: PathBuf::from("data/backups"),
            snapshot_interval: Duration::from_secs(3600),
            openrouter_api_key: String::new(),
            referer: "https://riformulatore-api.onrender.com".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `RIFORMULA_API_BIND`: Bind host (default: 0.0.0.0)
    /// - `PORT` / `RIFORMULA_API_PORT`: Bind port (default: 3000)
    /// - `RIFORMULA_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `RIFORMULA_DATA_DIR`: Store directory (default: data)
    /// - `RIFORMULA_BACKUP_DIR`: Backup directory (default: <data_dir>/backups)
    /// - `RIFORMULA_SNAPSHOT_INTERVAL_SECS`: Backup cadence (default: 3600)
    /// - `OPENROUTER_API_KEY`: Upstream credentials
    /// - `RIFORMULA_HTTP_REFERER`: Referer header forwarded upstream
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cors_origins = std::env::var("RIFORMULA_CORS_ORIGINS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let port = std::env::var("PORT")
            .ok()
            .or_else(|| std::env::var("RIFORMULA_API_PORT").ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);

        let data_dir = std::env::var("RIFORMULA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        let backup_dir = std::env::var("RIFORMULA_BACKUP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("backups"));

        Self {
            bind_host: std::env::var("RIFORMULA_API_BIND").unwrap_or(defaults.bind_host),
            port,
            cors_origins,
            data_dir,
            backup_dir,
            snapshot_interval: Duration::from_secs(
                std::env::var("RIFORMULA_SNAPSHOT_INTERVAL_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            openrouter_api_key: std::env::var("OPENROUTER_API_KEY").unwrap_or_default(),
            referer: std::env::var("RIFORMULA_HTTP_REFERER").unwrap_or(defaults.referer),
        }
    }

    /// Resolve the socket address to bind.
    pub fn resolve_bind_addr(&self) -> ApiResult<SocketAddr> {
        let addr = format!("{}:{}", self.bind_host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// True when an upstream key has been supplied.
    pub fn has_api_key(&self) -> bool {
        !self.openrouter_api_key.trim().is_empty()
    }
}
