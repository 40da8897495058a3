//! raycast-mcp configuration
//!
//! Configuration file: ~/.config/raycast-mcp/config.json (every field optional).
//! Environment overrides are applied on top of the file:
//! - RAYCAST_MCP_CONFIG  - alternate config file path
//! - RAYCAST_MCP_TIMEOUT - executor timeout in seconds
//! - RAYCAST_MCP_DRY_RUN - log automation invocations instead of running them
//! - RAYCAST_MCP_CONFIRM - set to 0/false to disable confirmation dialogs

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::paths::Paths;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound for a single automation invocation
    pub timeout_secs: u64,
    /// Ask before running destructive system functions
    pub confirm_destructive: bool,
    /// Log descriptors instead of invoking anything
    pub dry_run: bool,
    /// Application targeted by activation requests
    pub app_name: String,
    /// URL scheme used for deeplinks
    pub url_scheme: String,
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,
    /// Append confirmation decisions to the daily history log
    pub history: bool,
    /// Override for the credentials file location
    pub credentials_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            confirm_destructive: true,
            dry_run: false,
            app_name: "Raycast".to_string(),
            url_scheme: "raycast".to_string(),
            log_level: "info".to_string(),
            history: true,
            credentials_file: None,
        }
    }
}

impl Config {
    /// Load configuration from the default location plus environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var_os("RAYCAST_MCP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|| Paths::new().config_file());

        let mut config = Self::load_from(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.timeout_secs == 0 {
            warn!(
                "Ignoring timeout_secs = 0 in {}; using {}",
                path.display(),
                Self::default().timeout_secs
            );
            config.timeout_secs = Self::default().timeout_secs;
        }
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("RAYCAST_MCP_TIMEOUT") {
            match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => warn!("Ignoring invalid RAYCAST_MCP_TIMEOUT: {}", value),
            }
        }

        if let Some(value) = lookup("RAYCAST_MCP_DRY_RUN") {
            match parse_flag(&value) {
                Some(flag) => self.dry_run = flag,
                None => warn!("Ignoring invalid RAYCAST_MCP_DRY_RUN: {}", value),
            }
        }

        if let Some(value) = lookup("RAYCAST_MCP_CONFIRM") {
            match parse_flag(&value) {
                Some(flag) => self.confirm_destructive = flag,
                None => warn!("Ignoring invalid RAYCAST_MCP_CONFIRM: {}", value),
            }
        }
    }

    /// Executor timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Effective credentials file path
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_file
            .clone()
            .unwrap_or_else(|| Paths::new().credentials_file())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timeout_secs, 60);
        assert!(config.confirm_destructive);
        assert!(!config.dry_run);
        assert_eq!(config.app_name, "Raycast");
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_missing_file_yields_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = Config::load_from(&dir.path().join("absent.json"))?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeout_secs": 15, "app_name": "Raycast Beta"}"#)?;

        let config = Config::load_from(&path)?;
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.app_name, "Raycast Beta");
        assert!(config.confirm_destructive);
        assert_eq!(config.url_scheme, "raycast");
        Ok(())
    }

    #[test]
    fn test_malformed_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json")?;

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
        Ok(())
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("RAYCAST_MCP_TIMEOUT", "5"),
            ("RAYCAST_MCP_DRY_RUN", "true"),
            ("RAYCAST_MCP_CONFIRM", "0"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.timeout_secs, 5);
        assert!(config.dry_run);
        assert!(!config.confirm_destructive);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "RAYCAST_MCP_TIMEOUT" => Some("soon".to_string()),
            "RAYCAST_MCP_CONFIRM" => Some("maybe".to_string()),
            _ => None,
        });

        assert_eq!(config.timeout_secs, 60);
        assert!(config.confirm_destructive);
    }

    #[test]
    fn test_zero_timeout_in_file_falls_back_to_default() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeout_secs": 0, "dry_run": true}"#)?;

        let config = Config::load_from(&path)?;
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.dry_run);
        Ok(())
    }

    #[test]
    fn test_zero_timeout_in_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| (key == "RAYCAST_MCP_TIMEOUT").then(|| "0".to_string()));
        assert_eq!(config.timeout_secs, 60);
    }
}
