//! Application configuration management.
//!
//! Endpoints and the last-used login are stored at
//! `~/.config/lessondesk/config.json`. Environment variables
//! (`LESSONDESK_API_URL`, `LESSONDESK_API_KEY`, `LESSONDESK_HOME_API_URL`)
//! override the file, which keeps CI and scripted runs config-free.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "lessondesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL of the remote data store, e.g. `https://studio.example.co`
    pub api_url: Option<String>,
    /// Public API key sent with every data-store request
    pub api_key: Option<String>,
    /// Base URL of the dashboard home API
    pub home_api_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("LESSONDESK_API_URL") {
            config.api_url = Some(url);
        }
        if let Ok(key) = std::env::var("LESSONDESK_API_KEY") {
            config.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("LESSONDESK_HOME_API_URL") {
            config.home_api_url = Some(url);
        }

        Ok(config)
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

    /// Directory for the persisted session and log files.
    pub fn state_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
