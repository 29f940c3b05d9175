// src/config.rs
// =============================================================================
// Settings for a run, read from an optional TOML file.
//
// Precedence (highest first):
// 1. Command-line flags (--store, --user, --interval)
// 2. The file given with --config
// 3. Built-in defaults
//
// Example file:
//   user_id = "alice"
//   store_path = "links.json"
//   interval_minutes = 5
//   probe_timeout_secs = 10
//   link_delay_ms = 500
//   log_level = "info"
// =============================================================================

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::checker::DEFAULT_PROBE_TIMEOUT;
use crate::monitor::DEFAULT_LINK_DELAY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    pub user_id: String,
    pub store_path: PathBuf,
    pub interval_minutes: u32,
    pub probe_timeout_secs: u64,
    pub link_delay_ms: u64,
    pub log_level: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            user_id: "default".to_string(),
            store_path: PathBuf::from("links.json"),
            interval_minutes: 5,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT.as_secs(),
            link_delay_ms: DEFAULT_LINK_DELAY.as_millis() as u64,
            log_level: "info".to_string(),
        }
    }
}

impl MonitorConfig {
    // Loads the file if one was given, otherwise the defaults
    //
    // An explicitly named file that doesn't exist is an error: silently
    // falling back would monitor the wrong user's links.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(MonitorConfig::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs.max(1))
    }

    pub fn link_delay(&self) -> Duration {
        Duration::from_millis(self.link_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::load(None).unwrap();
        assert_eq!(config.interval_minutes, 5);
        assert_eq!(config.probe_timeout(), Duration::from_secs(10));
        assert_eq!(config.link_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = MonitorConfig::from_toml("user_id = \"alice\"\ninterval_minutes = 15\n").unwrap();
        assert_eq!(config.user_id, "alice");
        assert_eq!(config.interval_minutes, 15);
        assert_eq!(config.store_path, PathBuf::from("links.json"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(
            MonitorConfig::from_toml("intervall = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        match MonitorConfig::load(Some(path.as_path())) {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected an I/O error, got {other:?}"),
        }
    }
}
