//! Configuration loading and typed config structures for the Idle Village
//! engine.
//!
//! The canonical configuration lives in `village-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure and a loader that reads and validates the file. Every
//! field has a default, so an empty or missing file yields a playable game.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use village_ledger::BalanceTable;

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

    /// A value parsed but is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level game configuration.
///
/// Mirrors the structure of `village-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Costs, capacities, yields and goal scaling.
    #[serde(default)]
    pub balance: BalanceTable,

    /// Day/night cycle timing.
    #[serde(default)]
    pub clock: ClockConfig,

    /// Session scheduler timing and limits.
    #[serde(default)]
    pub session: SessionConfig,

    /// Where progress is saved.
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP/WebSocket surface.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `VILLAGE_SAVE_DIR` overrides `storage.save_dir`
    /// - `VILLAGE_DRAGONFLY_URL` overrides `storage.dragonfly_url`
    /// - `VILLAGE_OBSERVER_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load from `path` if it exists, otherwise use defaults (with env
    /// overrides still applied).
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml treats an empty document as null; map that to defaults.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("VILLAGE_SAVE_DIR") {
            self.storage.save_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("VILLAGE_DRAGONFLY_URL") {
            self.storage.dragonfly_url = val;
        }
        if let Ok(val) = std::env::var("VILLAGE_OBSERVER_PORT") {
            match val.parse() {
                Ok(port) => self.observer.port = port,
                Err(_) => tracing::warn!(value = %val, "ignoring malformed VILLAGE_OBSERVER_PORT"),
            }
        }
    }

    /// Reject values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.clock.phase_duration_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "clock.phase_duration_secs",
                reason: "must be greater than zero",
            });
        }
        if self.clock.recompute_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "clock.recompute_interval_ms",
                reason: "must be greater than zero",
            });
        }
        if self.session.production_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "session.production_interval_ms",
                reason: "must be greater than zero",
            });
        }
        if self.session.max_resolution_ticks == 0 {
            return Err(ConfigError::Invalid {
                field: "session.max_resolution_ticks",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}

/// Day/night cycle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// Length of one day or one night, in seconds.
    #[serde(default = "default_phase_duration_secs")]
    pub phase_duration_secs: u64,

    /// How often the phase is recomputed from wall-clock time.
    #[serde(default = "default_recompute_interval_ms")]
    pub recompute_interval_ms: u64,
}

impl ClockConfig {
    /// Phase length as a [`Duration`].
    pub const fn phase_duration(&self) -> Duration {
        Duration::from_secs(self.phase_duration_secs)
    }

    /// Recompute interval as a [`Duration`].
    pub const fn recompute_interval(&self) -> Duration {
        Duration::from_millis(self.recompute_interval_ms)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            phase_duration_secs: default_phase_duration_secs(),
            recompute_interval_ms: default_recompute_interval_ms(),
        }
    }
}

/// Session scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// Passive production tick interval.
    #[serde(default = "default_production_interval_ms")]
    pub production_interval_ms: u64,

    /// Minimum time between two manual gathers of the same resource.
    #[serde(default = "default_gather_cooldown_ms")]
    pub gather_cooldown_ms: u64,

    /// Upper bound on resolution ticks drained per mutation.
    #[serde(default = "default_max_resolution_ticks")]
    pub max_resolution_ticks: u32,

    /// Notifications kept in the queue; oldest dropped first.
    #[serde(default = "default_notification_limit")]
    pub notification_limit: usize,

    /// Capacity of the request channel into the session task.
    #[serde(default = "default_request_buffer")]
    pub request_buffer: usize,
}

impl SessionConfig {
    /// Production interval as a [`Duration`].
    pub const fn production_interval(&self) -> Duration {
        Duration::from_millis(self.production_interval_ms)
    }

    /// Gather cooldown as a [`Duration`].
    pub const fn gather_cooldown(&self) -> Duration {
        Duration::from_millis(self.gather_cooldown_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            production_interval_ms: default_production_interval_ms(),
            gather_cooldown_ms: default_gather_cooldown_ms(),
            max_resolution_ticks: default_max_resolution_ticks(),
            notification_limit: default_notification_limit(),
            request_buffer: default_request_buffer(),
        }
    }
}

/// Which save backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file per key under `save_dir`.
    #[default]
    File,
    /// Process memory only; progress is lost on exit.
    Memory,
    /// Redis-compatible server at `dragonfly_url`.
    Dragonfly,
}

/// Persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the file backend.
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// Dragonfly (Redis-compatible) URL.
    #[serde(default = "default_dragonfly_url")]
    pub dragonfly_url: String,

    /// Pending writes buffered before new ones are dropped.
    #[serde(default = "default_write_buffer")]
    pub write_buffer: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            save_dir: default_save_dir(),
            dragonfly_url: default_dragonfly_url(),
            write_buffer: default_write_buffer(),
        }
    }
}

/// Observer (HTTP/WebSocket) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Whether to serve the observer API at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// TCP port to bind on all interfaces.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

const fn default_phase_duration_secs() -> u64 {
    300
}
const fn default_recompute_interval_ms() -> u64 {
    1000
}
const fn default_production_interval_ms() -> u64 {
    1000
}
const fn default_gather_cooldown_ms() -> u64 {
    100
}
const fn default_max_resolution_ticks() -> u32 {
    64
}
const fn default_notification_limit() -> usize {
    50
}
const fn default_request_buffer() -> usize {
    64
}
fn default_save_dir() -> PathBuf {
    PathBuf::from("saves")
}
fn default_dragonfly_url() -> String {
    "redis://localhost:6379".to_owned()
}
const fn default_write_buffer() -> usize {
    16
}
const fn default_true() -> bool {
    true
}
const fn default_observer_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.clock.phase_duration_secs, 300);
        assert_eq!(config.session.production_interval_ms, 1000);
        assert_eq!(config.session.gather_cooldown_ms, 100);
        assert_eq!(config.session.notification_limit, 50);
        assert_eq!(config.balance.hire_base_food_cost, 10);
        assert_eq!(config.storage.backend, StorageBackend::File);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
balance:
  hire_base_food_cost: 12
  village_goal_reward_gold: 75

clock:
  phase_duration_secs: 60
  recompute_interval_ms: 500

session:
  production_interval_ms: 2000
  gather_cooldown_ms: 250
  max_resolution_ticks: 16
  notification_limit: 10
  request_buffer: 8

storage:
  backend: memory
  save_dir: "/tmp/village"
  write_buffer: 4

observer:
  enabled: false
  port: 9090

logging:
  level: debug
  json: true
"#;
        let config: GameConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.balance.hire_base_food_cost, 12);
        assert_eq!(config.balance.hire_cost_step, 2);
        assert_eq!(config.balance.village_goal_reward_gold, 75);
        assert_eq!(config.clock.phase_duration(), Duration::from_secs(60));
        assert_eq!(config.session.gather_cooldown(), Duration::from_millis(250));
        assert_eq!(config.session.max_resolution_ticks, 16);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.save_dir, PathBuf::from("/tmp/village"));
        assert!(!config.observer.enabled);
        assert_eq!(config.observer.port, 9090);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn parse_partial_yaml_uses_defaults() {
        let config: GameConfig = serde_yml::from_str("clock:\n  phase_duration_secs: 10\n").unwrap();
        assert_eq!(config.clock.phase_duration_secs, 10);
        assert_eq!(config.clock.recompute_interval_ms, 1000);
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn empty_document_is_default() {
        let config = GameConfig::parse("   \n").unwrap();
        assert_eq!(config.balance, BalanceTable::default());
        assert_eq!(config.clock, ClockConfig::default());
    }

    #[test]
    fn zero_phase_duration_is_rejected() {
        let result = GameConfig::parse("clock:\n  phase_duration_secs: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "clock.phase_duration_secs",
                ..
            })
        ));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = GameConfig::parse("clock: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("village-config.yaml");
        if path.exists() {
            let config = GameConfig::from_file(&path).unwrap();
            assert_eq!(config.balance, BalanceTable::default());
            assert_eq!(config.clock, ClockConfig::default());
            assert_eq!(config.session, SessionConfig::default());
        }
    }
}
