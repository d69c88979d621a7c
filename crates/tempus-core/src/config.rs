//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `tempus-config.yaml` at the
//! deployment root. This module defines strongly-typed structs that mirror
//! the YAML structure and a loader that reads the file. Every field has a
//! default, so an empty file (or no file at all) yields a runnable
//! configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration for the clock host.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TempusConfig {
    /// Clock cadence and start-time settings.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Persistence settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Per-world timezone settings.
    #[serde(default)]
    pub worlds: WorldsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TempusConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Clock cadence and start-time configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClockConfig {
    /// Whether the clock engine runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Real seconds per simulated minute at speed 1.0.
    #[serde(default = "default_real_seconds_per_minute")]
    pub real_seconds_per_minute: u64,

    /// Speed multiplier applied once at startup.
    #[serde(default = "default_speed")]
    pub default_speed: f64,

    /// Optional fixed start time applied after the persisted state loads.
    #[serde(default)]
    pub start_time: Option<StartTimeConfig>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            real_seconds_per_minute: default_real_seconds_per_minute(),
            default_speed: default_speed(),
            start_time: None,
        }
    }
}

/// A fixed simulated time to jump to at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StartTimeConfig {
    /// Day to start on (1-based).
    pub day: u64,
    /// Hour to start at (0-23).
    pub hour: u32,
    /// Minute to start at (0-59).
    pub minute: u32,
}

/// Persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DataConfig {
    /// Path of the snapshot file.
    #[serde(default = "default_data_file")]
    pub file: String,

    /// Minutes between automatic snapshot flushes (0 = disabled).
    #[serde(default = "default_auto_save_interval_minutes")]
    pub auto_save_interval_minutes: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            file: default_data_file(),
            auto_save_interval_minutes: default_auto_save_interval_minutes(),
        }
    }
}

/// Per-world timezone configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WorldsConfig {
    /// Whether configured zones are applied at startup.
    #[serde(default = "default_true")]
    pub timezone_enabled: bool,

    /// Zone entries keyed by world name.
    #[serde(default)]
    pub zones: BTreeMap<String, ZoneEntryConfig>,
}

impl Default for WorldsConfig {
    fn default() -> Self {
        Self {
            timezone_enabled: true,
            zones: BTreeMap::new(),
        }
    }
}

/// One world's zone entry: a named preset, or an explicit offset/speed.
///
/// When `preset` is set it wins; `offset` and `speed` are then ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ZoneEntryConfig {
    /// Name of a predefined zone (e.g. `eternal_day`, `utc_plus_6`).
    #[serde(default)]
    pub preset: Option<String>,

    /// Static offset in simulated minutes.
    #[serde(default)]
    pub offset: i64,

    /// Speed multiplier.
    #[serde(default = "default_speed")]
    pub speed: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_real_seconds_per_minute() -> u64 {
    17
}

const fn default_speed() -> f64 {
    1.0
}

fn default_data_file() -> String {
    "tempus-data.dat".to_owned()
}

const fn default_auto_save_interval_minutes() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = TempusConfig::default();
        assert!(config.clock.enabled);
        assert_eq!(config.clock.real_seconds_per_minute, 17);
        assert!((config.clock.default_speed - 1.0).abs() < f64::EPSILON);
        assert!(config.clock.start_time.is_none());
        assert_eq!(config.data.auto_save_interval_minutes, 30);
        assert!(config.worlds.zones.is_empty());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
clock:
  enabled: true
  real-seconds-per-minute: 5
  default-speed: 2.0
  start-time:
    day: 10
    hour: 8
    minute: 30

data:
  file: "state/timedata.dat"
  auto-save-interval-minutes: 15

worlds:
  timezone-enabled: true
  zones:
    overworld:
      offset: 0
      speed: 1.0
    nightrealm:
      preset: eternal_night
    frontier:
      offset: -360
      speed: 2.0

logging:
  level: "debug"
"#;

        let config = TempusConfig::parse(yaml).unwrap();
        assert_eq!(config.clock.real_seconds_per_minute, 5);
        assert_eq!(
            config.clock.start_time,
            Some(StartTimeConfig {
                day: 10,
                hour: 8,
                minute: 30
            })
        );
        assert_eq!(config.data.file, "state/timedata.dat");
        assert_eq!(config.worlds.zones.len(), 3);

        let nightrealm = config.worlds.zones.get("nightrealm").unwrap();
        assert_eq!(nightrealm.preset.as_deref(), Some("eternal_night"));

        let frontier = config.worlds.zones.get("frontier").unwrap();
        assert_eq!(frontier.offset, -360);
        assert!((frontier.speed - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = TempusConfig::parse("clock:\n  default-speed: 3.0\n").unwrap();
        assert!((config.clock.default_speed - 3.0).abs() < f64::EPSILON);
        // Everything else uses defaults.
        assert_eq!(config.clock.real_seconds_per_minute, 17);
        assert_eq!(config.data.file, "tempus-data.dat");
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(TempusConfig::parse("").is_ok());
    }
}
