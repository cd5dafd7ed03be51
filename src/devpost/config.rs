use crate::error::{DevpostError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

/// Configuration for devpost, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevpostConfig {
    /// Public URL prefix for uploaded images. `file://` URLs when unset.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Ask before deleting a post.
    #[serde(default = "default_confirm_deletes")]
    pub confirm_deletes: bool,
}

fn default_confirm_deletes() -> bool {
    true
}

impl Default for DevpostConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            confirm_deletes: default_confirm_deletes(),
        }
    }
}

impl DevpostConfig {
    pub const KEYS: &'static [&'static str] = &["base-url", "confirm-deletes"];

    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "base-url" => Some(self.base_url.clone().unwrap_or_default()),
            "confirm-deletes" => Some(self.confirm_deletes.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "base-url" => {
                let value = value.trim();
                self.base_url = (!value.is_empty()).then(|| value.to_string());
                Ok(())
            }
            "confirm-deletes" => {
                self.confirm_deletes = parse_bool(value).ok_or_else(|| {
                    DevpostError::Config(format!("Invalid value for confirm-deletes: {}", value))
                })?;
                Ok(())
            }
            _ => Err(DevpostError::Config(format!("Unknown config key: {}", key))),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DevpostConfig::default();
        assert_eq!(config.base_url, None);
        assert!(config.confirm_deletes);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = DevpostConfig::load(dir.path().join("nowhere")).unwrap();
        assert_eq!(config, DevpostConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DevpostConfig::default();
        config.set("base-url", "https://cdn.example.com").unwrap();
        config.set("confirm-deletes", "no").unwrap();
        config.save(dir.path()).unwrap();

        let loaded = DevpostConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.base_url.as_deref(), Some("https://cdn.example.com"));
        assert!(!loaded.confirm_deletes);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let config: DevpostConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DevpostConfig::default());
    }

    #[test]
    fn test_set_rejects_unknown_key_and_bad_bool() {
        let mut config = DevpostConfig::default();
        assert!(config.set("file-ext", ".md").is_err());
        assert!(config.set("confirm-deletes", "maybe").is_err());
        assert!(config.confirm_deletes);
    }

    #[test]
    fn test_blank_base_url_clears_it() {
        let mut config = DevpostConfig::default();
        config.set("base-url", "https://x").unwrap();
        config.set("base-url", "  ").unwrap();
        assert_eq!(config.get("base-url").as_deref(), Some(""));
    }
}
