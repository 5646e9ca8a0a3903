use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// The original widget talked to a Flask dev server on this port.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub endpoint: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// First run: write a config file holding the default endpoint so
    /// there is something on disk to edit. An existing file is left alone.
    pub fn write_default_if_missing() -> Result<()> {
        Self::write_default_to(&Self::config_path()?)
    }

    fn write_default_to(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        Config {
            endpoint: Some(DEFAULT_ENDPOINT.to_string()),
        }
        .save_to(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Endpoint resolution: GTM_CHAT_URL env var, then the config file,
    /// then the default dev server.
    pub fn resolve_endpoint(&self) -> String {
        std::env::var("GTM_CHAT_URL")
            .ok()
            .or_else(|| self.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("gtm-chat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            endpoint: Some("http://chat.internal:8080".to_string()),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(
            loaded.endpoint.as_deref(),
            Some("http://chat.internal:8080")
        );
    }

    #[test]
    fn test_write_default_creates_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        Config::write_default_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.endpoint.as_deref(), Some(DEFAULT_ENDPOINT));
    }

    #[test]
    fn test_write_default_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = Config {
            endpoint: Some("http://chat.internal:8080".to_string()),
        };
        config.save_to(&path).unwrap();

        Config::write_default_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(
            loaded.endpoint.as_deref(),
            Some("http://chat.internal:8080")
        );
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("missing.json")).unwrap();
        assert!(loaded.endpoint.is_none());
    }
}
