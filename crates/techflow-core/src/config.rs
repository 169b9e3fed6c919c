//! Client configuration management.
//!
//! Configuration is stored at `~/.config/techflow/config.json` and holds
//! the API base URL override and the last email used to log in. The
//! identity snapshot and log files live under the platform data
//! directory.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "techflow";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "TECHFLOW_API_URL";

/// Default API base URL when neither the environment nor the config file
/// overrides it
pub const DEFAULT_API_BASE_URL: &str = "https://api.techflow.dev/v1";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_base_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
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

    /// Directory for the identity snapshot and log files.
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Resolve the API base URL: environment variable, then config file,
    /// then the built-in default.
    pub fn resolved_base_url(&self) -> String {
        resolve_base_url(
            std::env::var(API_URL_ENV).ok(),
            self.api_base_url.as_deref(),
        )
    }
}

fn resolve_base_url(env_override: Option<String>, configured: Option<&str>) -> String {
    env_override
        .filter(|url| !url.trim().is_empty())
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_wins() {
        let url = resolve_base_url(
            Some("https://staging.techflow.dev/v1".to_string()),
            Some("https://configured.example/v1"),
        );
        assert_eq!(url, "https://staging.techflow.dev/v1");
    }

    #[test]
    fn test_blank_env_override_is_ignored() {
        let url = resolve_base_url(Some("  ".to_string()), Some("https://configured.example/v1"));
        assert_eq!(url, "https://configured.example/v1");
    }

    #[test]
    fn test_default_when_nothing_is_set() {
        assert_eq!(resolve_base_url(None, None), DEFAULT_API_BASE_URL);
    }
}
