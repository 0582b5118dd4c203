//! Service configuration loader - parses climate_service.toml
//!
//! Every setting has a default, so the file is optional. The database
//! location is not configured here; it comes from `DATABASE_URL` (see `db`).

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "climate_service.toml";

/// Upper bound for `api.window_days` (about 10,000 years).
pub const MAX_WINDOW_DAYS: i64 = 3_650_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid setting in {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },
}

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub api: ApiSettings,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Size of the request worker pool.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
            workers: 4,
        }
    }
}

impl ServerConfig {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Behaviour of the query routes
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSettings {
    /// Length of the trailing window used by the precipitation and tobs routes.
    pub window_days: i64,
    /// Serve date validation errors with HTTP 200 instead of 400.
    /// Older clients expect the error object on a success status.
    pub validation_errors_as_ok: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            window_days: 365,
            validation_errors_as_ok: false,
        }
    }
}

impl ApiSettings {
    /// Checks values serde cannot express as types.
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=MAX_WINDOW_DAYS).contains(&self.window_days) {
            return Err(format!(
                "api.window_days must be between 1 and {}, got {}",
                MAX_WINDOW_DAYS, self.window_days
            ));
        }
        Ok(())
    }
}

impl ServiceConfig {
    /// Parses and validates configuration from TOML text.
    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: ServiceConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.api.validate().map_err(|message| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        })?;

        Ok(config)
    }
}

/// Loads configuration.
///
/// An explicit `path` must exist. Without one, `climate_service.toml` in
/// the working directory is used if present, otherwise the defaults.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok(ServiceConfig::default());
            }
            default
        }
    };

    let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    ServiceConfig::from_toml(&contents, &path)
}
