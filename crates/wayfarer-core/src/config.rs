use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::ai::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::state::AppMode;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    /// Skip the mode-selection screen and start in this mode.
    pub default_mode: Option<AppMode>,
    pub night: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            gemini_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            default_mode: None,
            night: true,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// API key from the environment first, then the config file.
    pub fn api_key(&self) -> Option<String> {
        self.resolve_key().map(|(key, _)| key)
    }

    /// Returns the source of the API key: "env", "config", or None
    pub fn key_source(&self) -> Option<&'static str> {
        self.resolve_key().map(|(_, source)| source)
    }

    fn resolve_key(&self) -> Option<(String, &'static str)> {
        pick_key(std::env::var(API_KEY_ENV).ok(), self.gemini_api_key.as_deref())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("wayfarer"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}

/// First non-empty key, environment before file.
fn pick_key(env: Option<String>, file: Option<&str>) -> Option<(String, &'static str)> {
    match env.filter(|k| !k.is_empty()) {
        Some(key) => Some((key, "env")),
        None => file
            .filter(|k| !k.is_empty())
            .map(|k| (k.to_string(), "config")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!(config.night);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.gemini_api_key = Some("abc".into());
        config.default_mode = Some(AppMode::Standard);
        config.night = false;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "default_mode": "adventure" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_mode, Some(AppMode::Adventure));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.night);
    }

    #[test]
    fn test_pick_key_skips_empty_keys() {
        assert_eq!(pick_key(None, Some("")), None);
        assert_eq!(pick_key(Some(String::new()), Some("")), None);
        assert_eq!(
            pick_key(Some(String::new()), Some("file-key")),
            Some(("file-key".to_string(), "config"))
        );
        assert_eq!(
            pick_key(Some("env-key".into()), Some("file-key")),
            Some(("env-key".to_string(), "env"))
        );
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
