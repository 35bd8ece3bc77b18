//! Application configuration management.
//!
//! Configuration is read from `~/.config/bhyve-dashboard/config.json` when it
//! exists, then overridden by `BHYVE_*` environment variables. Every field
//! has a default, so a missing file is not an error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{DEFAULT_API_BASE_URL, REQUEST_TIMEOUT_SECS};

/// Application name used for the config directory path
const APP_NAME: &str = "bhyve-dashboard";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default port for the dashboard server
pub const DEFAULT_PORT: u16 = 5678;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_base_url: String,
    /// Directory the dashboard HTML is served from
    pub static_dir: PathBuf,
    /// Write daily log files here in addition to stderr
    pub log_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            static_dir: PathBuf::from("."),
            log_dir: None,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply `BHYVE_*` overrides, looking each variable up with `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("BHYVE_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("BHYVE_PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("BHYVE_PORT is not a port number: {}", port))?;
        }
        if let Some(base) = lookup("BHYVE_API_BASE") {
            self.api_base_url = base;
        }
        if let Some(dir) = lookup("BHYVE_STATIC_DIR") {
            self.static_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("BHYVE_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(dir)).filter(|d| !d.as_os_str().is_empty());
        }
        if let Some(secs) = lookup("BHYVE_TIMEOUT_SECS") {
            self.request_timeout_secs = secs
                .parse()
                .with_context(|| format!("BHYVE_TIMEOUT_SECS is not a number: {}", secs))?;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5678");
        assert_eq!(config.api_base_url, "https://api.orbitbhyve.com/v1");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"port": 8080, "static_dir": "/srv/dashboard"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, PathBuf::from("/srv/dashboard"));
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("BHYVE_PORT", "9000"),
                ("BHYVE_API_BASE", "http://localhost:1234"),
                ("BHYVE_LOG_DIR", "/var/log/bhyve"),
                ("BHYVE_TIMEOUT_SECS", "5"),
            ]))
            .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.api_base_url, "http://localhost:1234");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/bhyve")));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = Config::default();
        assert!(config.apply_overrides(env(&[("BHYVE_PORT", "high")])).is_err());
    }
}
