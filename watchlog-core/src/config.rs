//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/watchlog/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/watchlog/` (~/.config/watchlog/)
//! - Data: `$XDG_DATA_HOME/watchlog/` (~/.local/share/watchlog/)
//! - State/Logs: `$XDG_STATE_HOME/watchlog/` (~/.local/state/watchlog/)
//!
//! Configuration is passed explicitly to whatever needs it; there is no
//! module-level mutable state.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Store location
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Store location configuration
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Explicit database path; the XDG data directory is used when unset
    pub path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "watchlog_core=debug")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration, falling back to defaults when no file exists.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Path to the config file
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("watchlog/config.toml")
    }

    /// Directory for durable data (the store)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("watchlog")
    }

    /// Directory for logs
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("watchlog")
    }

    /// Resolved database path: explicit override or the XDG default
    pub fn database_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("history.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.database.path.is_none());
        assert!(config.database_path().ends_with("watchlog/history.db"));
    }

    #[test]
    fn test_database_path_override() {
        let config: Config = toml::from_str(
            r#"
            [database]
            path = "/tmp/custom/history.db"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/custom/history.db")
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [logging]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_config_path_suffix() {
        assert!(Config::config_path().ends_with("watchlog/config.toml"));
    }
}
