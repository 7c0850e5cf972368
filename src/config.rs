//! Application configuration management.
//!
//! Local settings (backend base URL, storage directory, default sync
//! interval, device push token) are stored at
//! `~/.config/guidecache/config.json`. The remote backend additionally
//! pushes a small configuration object through the Config table; that part
//! lands in [`crate::prefs::Prefs`] and is modeled by [`RemoteConfig`].

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/storage directory paths
const APP_NAME: &str = "guidecache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default refresh cadence when the backend has not supplied one.
/// 30 minutes keeps an event-guide dataset fresh without hammering the API.
pub const DEFAULT_SYNC_INTERVAL_MS: i64 = 30 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub base_url: String,
    pub storage_dir: Option<PathBuf>,
    pub sync_interval_ms: i64,
    pub push_token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://api.eventguide.example".to_string(),
            storage_dir: None,
            sync_interval_ms: DEFAULT_SYNC_INTERVAL_MS,
            push_token: None,
        }
    }
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

        if let Ok(url) = std::env::var("GUIDECACHE_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(token) = std::env::var("GUIDECACHE_PUSH_TOKEN") {
            config.push_token = Some(token);
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
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the per-record JSON files and downloaded images.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.storage_dir {
            return Ok(dir.clone());
        }
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join("records"))
    }

    /// The prefs file lives outside the record storage directory so that a
    /// purge never touches it.
    pub fn prefs_path(&self) -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join("prefs.json"))
    }
}

/// Configuration object pushed by the backend through the Config table.
/// Only the keys the sync engine acts on are modeled; the full raw object is
/// kept in prefs for consumers that want the rest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub purge: bool,
    #[serde(rename = "syncRate")]
    pub sync_rate_ms: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_config_defaults() {
        let cfg: RemoteConfig = serde_json::from_str("{}").unwrap();
        assert!(!cfg.purge);
        assert_eq!(cfg.sync_rate_ms, None);
    }

    #[test]
    fn remote_config_parses_purge_and_rate() {
        let cfg: RemoteConfig =
            serde_json::from_str(r#"{"purge": true, "syncRate": 60000, "welcome": "hi"}"#).unwrap();
        assert!(cfg.purge);
        assert_eq!(cfg.sync_rate_ms, Some(60000));
    }
}
