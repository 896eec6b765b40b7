//! Configuration file support for the carbon tracker.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/carbon/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub news: NewsConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Headline lookup configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_news_enabled")]
    pub enabled: bool,

    /// Falls back to the `NEWS_API_KEY` environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_news_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_news_query")]
    pub query: String,

    #[serde(default = "default_news_language")]
    pub language: String,

    #[serde(default = "default_news_page_size")]
    pub page_size: usize,

    #[serde(default = "default_news_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            enabled: default_news_enabled(),
            api_key: None,
            endpoint: default_news_endpoint(),
            query: default_news_query(),
            language: default_news_language(),
            page_size: default_news_page_size(),
            timeout_secs: default_news_timeout_secs(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("carbon")
}

fn default_news_enabled() -> bool {
    true
}

fn default_news_endpoint() -> String {
    "https://newsapi.org/v2/everything".into()
}

fn default_news_query() -> String {
    "environment".into()
}

fn default_news_language() -> String {
    "en".into()
}

fn default_news_page_size() -> usize {
    5
}

fn default_news_timeout_secs() -> u64 {
    5
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            other => {
                tracing::info!("No config file found at {:?}, using defaults", other);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("carbon").join("config.toml"))
    }

    /// Reject values that would make the engine misbehave
    pub fn validate(&self) -> Result<()> {
        if self.news.timeout_secs == 0 {
            return Err(Error::Config("news.timeout_secs must be at least 1".into()));
        }
        if self.news.page_size == 0 {
            return Err(Error::Config("news.page_size must be at least 1".into()));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.news.enabled);
        assert_eq!(config.news.page_size, 5);
        assert_eq!(config.news.timeout_secs, 5);
        assert!(config.news.api_key.is_none());
        assert!(config.data.data_dir.ends_with("carbon"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.news.query = "climate".into();
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.news.query, "climate");
        assert_eq!(parsed.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[news]
enabled = false
page_size = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(!config.news.enabled);
        assert_eq!(config.news.page_size, 3);
        assert_eq!(config.news.language, "en"); // default
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[news]\ntimeout_secs = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
