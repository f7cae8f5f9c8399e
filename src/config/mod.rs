//! Application configuration.
//!
//! The configuration is a JSON file, read once at startup. Every field has a
//! default, so a partial file (or no file at all) is valid.
//!
//! ```json
//! {
//!   "short_interval_secs": 3480,
//!   "music_files": ["soothing.mp3", "ambient.wav"],
//!   "message_mode": "SEQUENTIAL"
//! }
//! ```

mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::ConfigError;

use crate::session::{BlockingMode, DisplayInfo};
use crate::types::{BreakProfile, SelectionMode};

/// Directory name under the platform config dir.
const APP_DIR: &str = "disengage";

/// Config file name.
const CONFIG_FILE: &str = "config.json";

fn default_short_interval_secs() -> u64 {
    60 * 60
}

fn default_short_duration_secs() -> u64 {
    2 * 60
}

fn default_long_interval_secs() -> u64 {
    3 * 60 * 60
}

fn default_long_duration_secs() -> u64 {
    5 * 60
}

fn default_skip_threshold_secs() -> u64 {
    25 * 60
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_warning_lead_secs() -> u64 {
    60
}

fn default_prompt_countdown_secs() -> u64 {
    60
}

fn default_music_files() -> Vec<PathBuf> {
    vec![PathBuf::from("soothing.mp3")]
}

fn default_wellness_messages() -> Vec<String> {
    [
        "Rest your eyes and stretch",
        "Look 20 feet away for 20 seconds",
        "Stand up and walk around",
        "Drink water and stay hydrated",
        "Deep breathing - In for 4, hold for 4, out for 4",
        "Neck and shoulder rolls",
        "Blink slowly 10 times",
        "Relax your jaw and neck",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Full application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_short_interval_secs")]
    pub short_interval_secs: u64,

    #[serde(default = "default_short_duration_secs")]
    pub short_duration_secs: u64,

    #[serde(default = "default_long_interval_secs")]
    pub long_interval_secs: u64,

    #[serde(default = "default_long_duration_secs")]
    pub long_duration_secs: u64,

    /// Skip a short break when the long break is at most this many seconds away.
    #[serde(default = "default_skip_threshold_secs")]
    pub skip_threshold_secs: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Seconds between the prompt and the nominal break time.
    #[serde(default = "default_warning_lead_secs")]
    pub warning_lead_secs: u64,

    #[serde(default = "default_prompt_countdown_secs")]
    pub prompt_countdown_secs: u64,

    /// Music play-list. Relative paths resolve against the working directory.
    #[serde(default = "default_music_files")]
    pub music_files: Vec<PathBuf>,

    #[serde(default)]
    pub music_mode: SelectionMode,

    #[serde(default = "default_wellness_messages")]
    pub wellness_messages: Vec<String>,

    #[serde(default)]
    pub message_mode: SelectionMode,

    #[serde(default)]
    pub blocking_mode: BlockingMode,

    /// Static display layout, used when no monitor enumeration is available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub displays: Option<Vec<DisplayInfo>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            short_interval_secs: default_short_interval_secs(),
            short_duration_secs: default_short_duration_secs(),
            long_interval_secs: default_long_interval_secs(),
            long_duration_secs: default_long_duration_secs(),
            skip_threshold_secs: default_skip_threshold_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            warning_lead_secs: default_warning_lead_secs(),
            prompt_countdown_secs: default_prompt_countdown_secs(),
            music_files: default_music_files(),
            music_mode: SelectionMode::default(),
            wellness_messages: default_wellness_messages(),
            message_mode: SelectionMode::default(),
            blocking_mode: BlockingMode::default(),
            displays: None,
        }
    }
}

impl AppConfig {
    /// Returns the default config file location, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Loads and validates the configuration.
    ///
    /// With an explicit `path` the file must exist. Without one, the default
    /// location is tried and built-in defaults are used if it is absent.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration from a JSON file without validating it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` or `ConfigError::Parse`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Builds the scheduling profile.
    #[must_use]
    pub fn profile(&self) -> BreakProfile {
        BreakProfile {
            short_interval: Duration::from_secs(self.short_interval_secs),
            short_duration: Duration::from_secs(self.short_duration_secs),
            long_interval: Duration::from_secs(self.long_interval_secs),
            long_duration: Duration::from_secs(self.long_duration_secs),
            skip_threshold: Duration::from_secs(self.skip_threshold_secs),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            warning_lead: Duration::from_secs(self.warning_lead_secs),
            prompt_countdown: Duration::from_secs(self.prompt_countdown_secs),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.profile().validate().map_err(ConfigError::Invalid)?;
        if self.music_files.is_empty() {
            return Err(ConfigError::Invalid(
                "music_files に少なくとも1つのファイルを指定してください".to_string(),
            ));
        }
        if self.wellness_messages.is_empty() {
            return Err(ConfigError::Invalid(
                "wellness_messages に少なくとも1つのメッセージを指定してください".to_string(),
            ));
        }
        Ok(())
    }

    /// Serializes the configuration as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.music_files, vec![PathBuf::from("soothing.mp3")]);
        assert_eq!(config.wellness_messages.len(), 8);
        assert_eq!(config.message_mode, SelectionMode::Random);
        assert_eq!(config.blocking_mode, BlockingMode::Auto);
    }

    #[test]
    fn test_profile_conversion() {
        let config = AppConfig {
            short_interval_secs: 3480,
            ..AppConfig::default()
        };
        let profile = config.profile();
        assert_eq!(profile.short_interval, Duration::from_secs(3480));
        assert_eq!(profile.long_interval, Duration::from_secs(10800));
        assert_eq!(profile.skip_threshold, Duration::from_secs(1500));
    }

    #[test]
    fn test_deserialize_empty_json() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_json() {
        let json = r#"{
            "short_interval_secs": 3480,
            "music_files": ["a.mp3", "b.wav"],
            "message_mode": "SEQUENTIAL",
            "blocking_mode": "lock"
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.short_interval_secs, 3480);
        assert_eq!(config.long_interval_secs, 10800);
        assert_eq!(config.music_files.len(), 2);
        assert_eq!(config.message_mode, SelectionMode::Sequential);
        assert_eq!(config.music_mode, SelectionMode::Random);
        assert_eq!(config.blocking_mode, BlockingMode::Lock);
    }

    #[test]
    fn test_deserialize_displays() {
        let json = r#"{
            "displays": [
                {"width": 1920, "height": 1080, "x": 0, "y": 0, "is_primary": true, "name": "DP-1"},
                {"width": 2560, "height": 1440, "x": 1920, "y": 0}
            ]
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        let displays = config.displays.unwrap();
        assert_eq!(displays.len(), 2);
        assert_eq!(displays[1].x, 1920);
        assert!(!displays[1].is_primary);
    }

    #[test]
    fn test_validate_empty_music_files() {
        let config = AppConfig {
            music_files: vec![],
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_empty_messages() {
        let config = AppConfig {
            wellness_messages: vec![],
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_profile_invariant() {
        let config = AppConfig {
            skip_threshold_secs: 20000,
            ..AppConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"poll_interval_secs": 30}"#).unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.poll_interval_secs, 30);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            AppConfig::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_huge_break_length() {
        let config: AppConfig =
            serde_json::from_str(r#"{"long_duration_secs": 10000000000000000000}"#).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_json_round_trip_keeps_values() {
        let config = AppConfig {
            long_duration_secs: 600,
            ..AppConfig::default()
        };
        let json = config.to_json_pretty().unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
