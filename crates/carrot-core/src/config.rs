//! Configuration loading and typed config structures for the carrot model.
//!
//! The canonical configuration lives in `carrot-config.yaml` at the project
//! root. Every field has a default matching the classroom version of the
//! model, so an empty file (or no file) yields a working simulation.

use std::path::Path;

use carrot_types::{ComponentRef, GlucoseState};
use serde::Deserialize;

/// Shortest tick interval the driver accepts, in milliseconds.
pub const MIN_TICK_INTERVAL_MS: u64 = 100;

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
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level model configuration.
///
/// Mirrors the structure of `carrot-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModelConfig {
    /// Timing and length of a trial.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Glucose accounting constants.
    #[serde(default)]
    pub glucose: GlucoseConfig,

    /// Peer components whose answers are attached to each trial.
    #[serde(default)]
    pub context: ContextConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ModelConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `CARROT_TICK_INTERVAL_MS` overrides `simulation.tick_interval_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.simulation.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.max_weeks == 0 {
            return Err(ConfigError::Invalid {
                reason: "simulation.max_weeks must be at least 1".to_owned(),
            });
        }
        if self.simulation.tick_interval_ms < MIN_TICK_INTERVAL_MS {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "simulation.tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS}, got {}",
                    self.simulation.tick_interval_ms
                ),
            });
        }
        if self.glucose.used_per_week < 0 || self.glucose.created_per_week < 0 {
            return Err(ConfigError::Invalid {
                reason: "glucose increments must not be negative".to_owned(),
            });
        }
        Ok(())
    }
}

/// Timing and length of a trial.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Last simulated week; the tick after it ends the trial.
    #[serde(default = "default_max_weeks")]
    pub max_weeks: u32,

    /// Real-time milliseconds per simulated week.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl SimulationConfig {
    /// Apply environment variable overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `CARROT_TICK_INTERVAL_MS` is not
    /// an unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("CARROT_TICK_INTERVAL_MS") {
            self.tick_interval_ms = val.trim().parse().map_err(|_err| ConfigError::Invalid {
                reason: format!("CARROT_TICK_INTERVAL_MS is not a number: {val}"),
            })?;
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_weeks: default_max_weeks(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Glucose accounting constants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlucoseConfig {
    /// Glucose created before the first week.
    #[serde(default = "default_initial_created")]
    pub initial_created: i32,

    /// Glucose used before the first week.
    #[serde(default = "default_initial_used")]
    pub initial_used: i32,

    /// Glucose created per lit week.
    #[serde(default = "default_created_per_week")]
    pub created_per_week: i32,

    /// Glucose used per week regardless of light.
    #[serde(default = "default_used_per_week")]
    pub used_per_week: i32,
}

impl GlucoseConfig {
    /// The week-0 ledger.
    pub const fn initial_state(&self) -> GlucoseState {
        GlucoseState::from_totals(self.initial_created, self.initial_used)
    }
}

impl Default for GlucoseConfig {
    fn default() -> Self {
        Self {
            initial_created: default_initial_created(),
            initial_used: default_initial_used(),
            created_per_week: default_created_per_week(),
            used_per_week: default_used_per_week(),
        }
    }
}

/// Peer components whose answers are captured when a trial starts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContextConfig {
    /// Components to query, in display order.
    #[serde(default = "default_components")]
    pub components: Vec<ComponentEntry>,
}

impl ContextConfig {
    /// The configured components as typed references.
    pub fn component_refs(&self) -> Vec<ComponentRef> {
        self.components
            .iter()
            .map(|c| ComponentRef::new(&c.node_id, &c.component_id))
            .collect()
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            components: default_components(),
        }
    }
}

/// One peer component reference as written in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ComponentEntry {
    /// Node identifier.
    pub node_id: String,
    /// Component identifier.
    pub component_id: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

const fn default_max_weeks() -> u32 {
    20
}

const fn default_tick_interval_ms() -> u64 {
    2000
}

const fn default_initial_created() -> i32 {
    10
}

const fn default_initial_used() -> i32 {
    2
}

const fn default_created_per_week() -> i32 {
    10
}

const fn default_used_per_week() -> i32 {
    5
}

fn default_components() -> Vec<ComponentEntry> {
    vec![
        ComponentEntry {
            node_id: "node54".to_owned(),
            component_id: "yo6qlvcg3u".to_owned(),
        },
        ComponentEntry {
            node_id: "node54".to_owned(),
            component_id: "17qww5dxhs".to_owned(),
        },
    ]
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_log_format() -> String {
    "pretty".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_classroom_model() {
        let config = ModelConfig::default();
        assert_eq!(config.simulation.max_weeks, 20);
        assert_eq!(config.simulation.tick_interval_ms, 2000);
        assert_eq!(config.glucose.initial_state(), GlucoseState::from_totals(10, 2));
        assert_eq!(config.glucose.initial_state().stored, 8);
        assert_eq!(config.glucose.created_per_week, 10);
        assert_eq!(config.glucose.used_per_week, 5);
        assert_eq!(config.context.components.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
simulation:
  max_weeks: 12
  tick_interval_ms: 500

glucose:
  initial_created: 20
  initial_used: 4
  created_per_week: 8
  used_per_week: 6

context:
  components:
    - node_id: node7
      component_id: abc

logging:
  level: debug
  format: json
";
        let config = ModelConfig::parse(yaml).unwrap();
        assert_eq!(config.simulation.max_weeks, 12);
        assert_eq!(config.simulation.tick_interval_ms, 500);
        assert_eq!(config.glucose.initial_state().stored, 16);
        assert_eq!(config.glucose.created_per_week, 8);
        assert_eq!(
            config.context.component_refs(),
            vec![ComponentRef::new("node7", "abc")]
        );
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = ModelConfig::parse("simulation:\n  max_weeks: 5\n").unwrap();
        assert_eq!(config.simulation.max_weeks, 5);
        assert_eq!(config.simulation.tick_interval_ms, 2000);
        assert_eq!(config.glucose, GlucoseConfig::default());
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(ModelConfig::parse("").unwrap(), ModelConfig::default());
    }

    #[test]
    fn zero_weeks_rejected() {
        let result = ModelConfig::parse("simulation:\n  max_weeks: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn fast_ticks_rejected() {
        let result = ModelConfig::parse("simulation:\n  tick_interval_ms: 50\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn malformed_yaml_is_error() {
        let result = ModelConfig::parse("simulation: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
