//! Configuration module for depot.

use serde::Deserialize;
use std::path::Path;

use crate::{DepotError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins (empty = same-origin only).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/depot.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Blob storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory where uploaded blobs are written.
    #[serde(default = "default_storage_path")]
    pub path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u64,
}

fn default_storage_path() -> String {
    "data/uploads".to_string()
}

fn default_max_file_size() -> u64 {
    30
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            max_file_size_mb: default_max_file_size(),
        }
    }
}

/// Quota configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QuotaConfig {
    /// Maximum number of files one user may hold.
    #[serde(default = "default_max_files_per_user")]
    pub max_files_per_user: i64,
    /// Download byte budget per fixed one-minute window.
    #[serde(default = "default_max_bytes_per_minute")]
    pub max_bytes_per_minute: i64,
}

fn default_max_files_per_user() -> i64 {
    2
}

fn default_max_bytes_per_minute() -> i64 {
    1024 * 1024
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_files_per_user: default_max_files_per_user(),
            max_bytes_per_minute: default_max_bytes_per_minute(),
        }
    }
}

/// Tenant configuration.
///
/// The service runs with a single bootstrap user; this names it.
#[derive(Debug, Clone, Deserialize)]
pub struct TenantConfig {
    /// Email of the bootstrap user, created at startup if absent.
    #[serde(default = "default_tenant_email")]
    pub email: String,
}

fn default_tenant_email() -> String {
    "test@user.com".to_string()
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            email: default_tenant_email(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/depot.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Quota configuration.
    #[serde(default)]
    pub quota: QuotaConfig,
    /// Tenant configuration.
    #[serde(default)]
    pub tenant: TenantConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DepotError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DepotError::Config(format!("config parse error: {e}")))
    }

    /// Maximum upload size in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.storage.max_file_size_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "data/depot.db");
        assert_eq!(config.storage.path, "data/uploads");
        assert_eq!(config.storage.max_file_size_mb, 30);
        assert_eq!(config.quota.max_files_per_user, 2);
        assert_eq!(config.quota.max_bytes_per_minute, 1024 * 1024);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse(
            r#"
[server]
port = 3000

[quota]
max_files_per_user = 5
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.quota.max_files_per_user, 5);
        assert_eq!(config.quota.max_bytes_per_minute, 1024 * 1024);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.storage.max_file_size_mb, 30);
        assert_eq!(config.tenant.email, "test@user.com");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("server = \"not a table\"");
        assert!(matches!(result, Err(DepotError::Config(_))));
    }

    #[test]
    fn test_max_file_size_bytes() {
        let config = Config::default();
        assert_eq!(config.max_file_size_bytes(), 30 * 1024 * 1024);
    }
}
