//! # Application configuration
//!
//! Non-secret configuration loaded from a TOML file (path from
//! `VAULTBASE_CONFIG`, default `config.toml`). Secrets are read separately
//! from the environment by [`secrets::Secrets`] and are never part of this
//! file.

pub mod secrets;

pub use secrets::{SecretPurpose, Secrets};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GatewayError, Result};

/// Session and key lifetime constants, in seconds.
pub const ACCESS_TOKEN_TTL: i64 = 3600;
pub const REFRESH_TOKEN_TTL: i64 = 604_800; // 7 days
pub const DEFAULT_API_KEY_TTL: i64 = 604_800; // 7 days

/// Upper bound on storage upload bodies, in bytes.
pub const STORAGE_UPLOAD_SIZE_LIMIT: usize = 75_000_000;

/// Application main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub downstream: DownstreamConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/dev.db".to_string(),
        }
    }
}

/// The downstream service the cache and storage capabilities forward to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownstreamConfig {
    pub base_url: String,
    /// Value of the `authorization` header the downstream expects.
    #[serde(default)]
    pub auth_token: String,
    pub cache_set_path: String,
    pub cache_get_path: String,
    pub storage_upload_path: String,
    pub storage_download_path: String,
}

impl Default for DownstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            auth_token: String::new(),
            cache_set_path: "/api/caching/set".to_string(),
            cache_get_path: "/api/caching/get".to_string(),
            storage_upload_path: "/api/storage/upload-file".to_string(),
            storage_download_path: "/api/storage/get-file".to_string(),
        }
    }
}

/// Policy switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// When set, provisioning requires the owning account to be confirmed.
    #[serde(default)]
    pub require_confirmed_account: bool,
}

impl AppConfig {
    /// Load configuration from the given TOML file, falling back to
    /// defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::internal_with_source(format!("failed to read {}", path.display()), e)
        })?;
        toml::from_str(&raw).map_err(|e| {
            GatewayError::internal_with_source(format!("failed to parse {}", path.display()), e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert!(!config.policy.require_confirmed_account);
        assert!(config.database.url.starts_with("sqlite:"));
    }

    #[test]
    fn parses_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9090

            [policy]
            require_confirmed_account = true
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert!(config.policy.require_confirmed_account);
        // untouched sections fall back to defaults
        assert_eq!(config.downstream.cache_set_path, "/api/caching/set");
    }
}
