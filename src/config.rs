//! Configuration types for the orrery server.
//!
//! This module provides configuration structs for loading and validating
//! server settings from TOML files (`orrery.toml`). It includes:
//!
//! - [`Config`] - Root configuration struct
//! - [`ServerConfig`] - HTTP listener settings
//! - [`StorageConfig`] - Database and uploads directory locations
//!
//! All configuration types support serde deserialization and provide
//! sensible defaults suitable for development use. CLI flags override
//! file values after loading.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// orrery.toml configuration structure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

/// HTTP listener settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Exact origin allowed by CORS. When unset, any origin is allowed
    /// (the gallery client is typically served from a different host).
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: constants::DEFAULT_PORT,
            cors_origin: None,
        }
    }
}

/// Database and uploads directory locations.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file. Parent directories are created on startup.
    pub db_path: PathBuf,
    /// Directory derived image files are written to and served from.
    pub uploads_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/gallery.db"),
            uploads_dir: PathBuf::from("data/uploads"),
        }
    }
}

impl Config {
    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - Fields have invalid types
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from an optional path, falling back to defaults.
    ///
    /// A missing `path` yields the default configuration; a path that is
    /// given but unreadable is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate configuration with comprehensive checks.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails with one or more errors:
    /// - Port 0
    /// - Empty host
    /// - Empty database or uploads paths
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            errors.push(
                "Server port cannot be 0. Use a valid port number (1-65535)\n  \
                 Common ports: 5000 (default), 8080, 8000"
                    .to_string(),
            );
        }

        // Warn on system ports (< 1024)
        if self.server.port < 1024 && self.server.port > 0 {
            warnings.push(format!(
                "Port {} requires elevated privileges on most systems",
                self.server.port
            ));
        }

        if self.server.host.is_empty() {
            errors.push("server.host cannot be empty".to_string());
        }

        if let Some(origin) = &self.server.cors_origin
            && !origin.starts_with("http://")
            && !origin.starts_with("https://")
        {
            errors.push(format!(
                "server.cors_origin must be a full origin like https://gallery.example.com (got: '{origin}')"
            ));
        }

        if self.storage.db_path.as_os_str().is_empty() {
            errors.push("storage.db_path cannot be empty".to_string());
        }

        if self.storage.uploads_dir.as_os_str().is_empty() {
            errors.push("storage.uploads_dir cannot be empty".to_string());
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        let result = config.validate().unwrap();
        assert!(!result.has_warnings());
        assert_eq!(config.server.port, constants::DEFAULT_PORT);
        assert_eq!(config.storage.uploads_dir, PathBuf::from("data/uploads"));
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn system_port_warns() {
        let mut config = Config::default();
        config.server.port = 80;
        let result = config.validate().unwrap();
        assert!(result.has_warnings());
    }

    #[test]
    fn bare_hostname_cors_origin_is_rejected() {
        let mut config = Config::default();
        config.server.cors_origin = Some("gallery.example.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage.db_path, PathBuf::from("data/gallery.db"));
    }

    #[test]
    fn load_from_missing_file_errors() {
        assert!(Config::load_from("/nonexistent/orrery.toml").is_err());
    }

    #[test]
    fn load_or_default_without_path_uses_defaults() {
        let config = Config::load_or_default(None).unwrap();
        assert_eq!(config.server.port, constants::DEFAULT_PORT);
    }
}
