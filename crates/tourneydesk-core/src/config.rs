//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! backend base URL, session secret and max age, cache freshness window and
//! the last used username.
//!
//! Configuration is stored at `~/.config/tourneydesk/config.json`; the
//! `TOURNEYDESK_*` environment variables override the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "tourneydesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Backend sessions last 30 minutes unless configured otherwise.
const DEFAULT_SESSION_MAX_AGE_MINUTES: i64 = 30;

const DEFAULT_CACHE_STALE_MINUTES: i64 = 5;

pub const ENV_API_URL: &str = "TOURNEYDESK_API_URL";
pub const ENV_SESSION_SECRET: &str = "TOURNEYDESK_SESSION_SECRET";
pub const ENV_SESSION_MAX_AGE: &str = "TOURNEYDESK_SESSION_MAX_AGE";

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_session_max_age() -> i64 {
    DEFAULT_SESSION_MAX_AGE_MINUTES
}

fn default_cache_stale() -> i64 {
    DEFAULT_CACHE_STALE_MINUTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,
    #[serde(default = "default_session_max_age")]
    pub session_max_age_minutes: i64,
    #[serde(default = "default_cache_stale")]
    pub cache_stale_minutes: i64,
    #[serde(default)]
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            session_secret: None,
            session_max_age_minutes: DEFAULT_SESSION_MAX_AGE_MINUTES,
            cache_stale_minutes: DEFAULT_CACHE_STALE_MINUTES,
            last_username: None,
        }
    }
}

impl Config {
    /// Load the config file (or defaults) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(secret) = lookup(ENV_SESSION_SECRET).filter(|v| !v.is_empty()) {
            self.session_secret = Some(secret);
        }
        if let Some(max_age) = lookup(ENV_SESSION_MAX_AGE) {
            self.session_max_age_minutes = max_age
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of minutes", ENV_SESSION_MAX_AGE))?;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn session_max_age(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_max_age_minutes.max(1))
    }

    pub fn cache_stale_after(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.cache_stale_minutes.max(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = serde_json::from_str(r#"{"last_username":"admin"}"#).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.session_max_age_minutes, 30);
        assert_eq!(config.cache_stale_minutes, 5);
        assert_eq!(config.last_username.as_deref(), Some("admin"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_overrides(lookup(&[
                (ENV_API_URL, "https://api.league.gg"),
                (ENV_SESSION_SECRET, "s3cret"),
                (ENV_SESSION_MAX_AGE, "90"),
            ]))
            .unwrap();
        assert_eq!(config.api_base_url, "https://api.league.gg");
        assert_eq!(config.session_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.session_max_age(), chrono::Duration::minutes(90));
    }

    #[test]
    fn test_malformed_max_age_is_an_error() {
        let mut config = Config::default();
        let result = config.apply_overrides(lookup(&[(ENV_SESSION_MAX_AGE, "soon")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_secret_not_written_when_unset() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(!json.contains("session_secret"));
    }
}
