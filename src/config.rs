//! Configuration file parser for ~/.config/roster/config.toml.
//!
//! The config file is optional. A missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as a warning, since they are
//! usually typos.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::catalog::DEFAULT_BASE_URL;
use crate::coordinator::ListSettings;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog API root, e.g. `https://rickandmortyapi.com/api`.
    pub api_base_url: String,

    /// Quiet period after the last keystroke before a search is sent.
    pub search_debounce_ms: u64,

    /// Distance from the end of the list, in scroll units, that triggers
    /// loading the next page.
    pub scroll_threshold: f64,

    /// Per-request timeout for catalog calls.
    pub request_timeout_secs: u64,

    /// Retries for transient catalog failures (timeouts, 5xx, 429).
    pub max_retries: u32,

    /// Favorites database location. Defaults to `favorites.db` next to the
    /// config file.
    pub favorites_db: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            search_debounce_ms: 500,
            scroll_threshold: 300.0,
            request_timeout_secs: 20,
            max_retries: 2,
            favorites_db: None,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "api_base_url",
        "search_debounce_ms",
        "scroll_threshold",
        "request_timeout_secs",
        "max_retries",
        "favorites_db",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            api_base_url = %config.api_base_url,
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Scroll and debounce settings for the list coordinator.
    ///
    /// A negative threshold is treated as zero.
    pub fn list_settings(&self) -> ListSettings {
        ListSettings {
            scroll_threshold: self.scroll_threshold.max(0.0),
            search_debounce: Duration::from_millis(self.search_debounce_ms),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("roster_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "https://rickandmortyapi.com/api");
        assert_eq!(config.search_debounce_ms, 500);
        assert_eq!(config.scroll_threshold, 300.0);
        assert_eq!(config.request_timeout_secs, 20);
        assert_eq!(config.max_retries, 2);
        assert!(config.favorites_db.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/roster_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n  ");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "search_debounce_ms = 250\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.search_debounce_ms, 250);
        assert_eq!(config.scroll_threshold, 300.0);
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
api_base_url = "http://127.0.0.1:9000/api"
search_debounce_ms = 300
scroll_threshold = 120.5
request_timeout_secs = 5
max_retries = 0
favorites_db = "/tmp/roster-favs.db"
"#;
        let (dir, path) = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000/api");
        assert_eq!(config.search_debounce_ms, 300);
        assert_eq!(config.scroll_threshold, 120.5);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_retries, 0);
        assert_eq!(
            config.favorites_db.as_deref(),
            Some(Path::new("/tmp/roster-favs.db"))
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "search_debounce_ms = \"fast\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config("unknown", "max_retries = 1\ntheme = \"dark\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.max_retries, 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_list_settings_conversion() {
        let config = Config {
            search_debounce_ms: 750,
            scroll_threshold: -5.0,
            ..Config::default()
        };
        let settings = config.list_settings();
        assert_eq!(settings.search_debounce, Duration::from_millis(750));
        assert_eq!(settings.scroll_threshold, 0.0);
    }

    #[test]
    fn test_zero_timeout_clamped() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
