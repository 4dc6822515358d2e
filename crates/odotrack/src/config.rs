//! Configuration management for odotrack.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::view::ViewMode;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "odotrack";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "odotrack.db";

/// Default persistence slot holding the serialized readings.
pub const DEFAULT_SLOT_KEY: &str = "odometerReadings";

/// Default recognition endpoint (Google Generative Language API).
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default recognition model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variable that carries the recognition credential.
pub const API_KEY_ENV: &str = "API_KEY";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ODOTRACK_`, nested with `__`),
///    plus the bare `API_KEY` variable for the recognition credential
/// 2. TOML config file at `~/.config/odotrack/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Recognition service configuration.
    pub recognition: RecognitionConfig,
    /// Display configuration.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/odotrack/odotrack.db`
    pub database_path: Option<PathBuf>,
    /// Name of the slot that holds the serialized readings.
    pub slot_key: String,
}

/// Recognition service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Credential for the recognition service.
    pub api_key: Option<String>,
    /// Base URL of the recognition service.
    pub endpoint: String,
    /// Model used to interpret the photo.
    pub model: String,
}

/// Display-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// View shown when none is requested.
    pub default_view: ViewMode,
    /// Show distance traveled since the first reading by default.
    pub zero_readings: bool,
    /// `strftime` format for table rows.
    pub date_format: String,
    /// `strftime` format for chart labels.
    pub label_format: String,
    /// Width of the longest chart bar, in columns.
    pub chart_width: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            slot_key: DEFAULT_SLOT_KEY.to_string(),
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_view: ViewMode::Table,
            zero_readings: false,
            date_format: "%Y-%m-%d %H:%M:%S".to_string(),
            label_format: "%Y-%m-%d".to_string(),
            chart_width: 40,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("ODOTRACK_").split("__"))
            .merge(
                Env::raw()
                    .only(&[API_KEY_ENV])
                    .map(|_| "recognition.api_key".into()),
            );

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// A missing API key is not a validation failure; it surfaces when a
    /// reading is added.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.slot_key.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "slot_key must not be empty".to_string(),
            });
        }

        if self.recognition.endpoint.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "recognition endpoint must not be empty".to_string(),
            });
        }

        if self.recognition.model.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "recognition model must not be empty".to_string(),
            });
        }

        if self.display.date_format.is_empty() || self.display.label_format.is_empty() {
            return Err(Error::ConfigValidation {
                message: "date_format and label_format must not be empty".to_string(),
            });
        }

        for format in [&self.display.date_format, &self.display.label_format] {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(Error::ConfigValidation {
                    message: format!("invalid date format: {format}"),
                });
            }
        }

        if self.display.chart_width == 0 {
            return Err(Error::ConfigValidation {
                message: "chart_width must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// The recognition credential, if one is configured and non-blank.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.recognition
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// A copy of this configuration that is safe to print.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.recognition.api_key.is_some() {
            config.recognition.api_key = Some("********".to_string());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.storage.slot_key, "odometerReadings");
        assert!(config.recognition.api_key.is_none());
        assert_eq!(config.display.default_view, ViewMode::Table);
        assert!(!config.display.zero_readings);
    }

    #[test]
    fn test_default_recognition_config() {
        let recognition = RecognitionConfig::default();

        assert_eq!(recognition.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(recognition.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_api_key_is_ok() {
        let mut config = Config::default();
        config.recognition.api_key = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_slot_key() {
        let mut config = Config::default();
        config.storage.slot_key = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("slot_key"));
    }

    #[test]
    fn test_validate_empty_model() {
        let mut config = Config::default();
        config.recognition.model = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("model"));
    }

    #[test]
    fn test_validate_bad_date_format() {
        let mut config = Config::default();
        config.display.label_format = "%J".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid date format"));
    }

    #[test]
    fn test_validate_zero_chart_width() {
        let mut config = Config::default();
        config.display.chart_width = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("chart_width"));
    }

    #[test]
    fn test_api_key_blank_is_none() {
        let mut config = Config::default();
        config.recognition.api_key = Some("   ".to_string());
        assert!(config.api_key().is_none());

        config.recognition.api_key = Some(" secret ".to_string());
        assert_eq!(config.api_key(), Some("secret"));
    }

    #[test]
    fn test_redacted_masks_api_key() {
        let mut config = Config::default();
        config.recognition.api_key = Some("secret".to_string());

        let redacted = config.redacted();
        assert_eq!(redacted.recognition.api_key.as_deref(), Some("********"));
        assert_eq!(config.recognition.api_key.as_deref(), Some("secret"));

        let json = serde_json::to_string(&redacted).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("odotrack.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("odotrack"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\nslot_key = \"readings\"\ndatabase_path = \"/tmp/odo.db\"\n\n[display]\ndefault_view = \"chart\"\nzero_readings = true\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.storage.slot_key, "readings");
        assert_eq!(config.database_path(), PathBuf::from("/tmp/odo.db"));
        assert_eq!(config.display.default_view, ViewMode::Chart);
        assert!(config.display.zero_readings);
    }

    #[test]
    fn test_load_invalid_toml_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\nchart_width = 0\n").unwrap();

        let result = Config::load_from(Some(path));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_display_config_deserialize() {
        let json = r#"{"default_view": "chart", "chart_width": 20}"#;
        let display: DisplayConfig = serde_json::from_str(json).unwrap();
        assert_eq!(display.default_view, ViewMode::Chart);
        assert_eq!(display.chart_width, 20);
        assert_eq!(display.label_format, "%Y-%m-%d");
    }
}
