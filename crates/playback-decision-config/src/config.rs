// crates/playback-decision-config/src/config.rs
// ============================================================================
// Module: Playback Decision Configuration
// Description: Configuration loading and validation for the decision engine.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: playback-decision-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and falls back to engine defaults, but any value
//! that is present must validate. Invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use playback_decision_core::DEFAULT_HASH_ALGORITHM;
use playback_decision_core::EngineConfig;
use playback_decision_core::runtime::DEFAULT_MAX_INPUT_BYTES;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "playback-decision.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PLAYBACK_DECISION_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for the accepted request body size.
pub const MAX_INPUT_BYTES_LIMIT: usize = 1024 * 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Playback decision configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DecisionConfig {
    /// Engine limits.
    #[serde(default)]
    pub engine: EngineSection,
    /// Telemetry toggles.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Log output configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DecisionConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml(content)
    }

    /// Loads configuration when a path was given or the override variable is
    /// set; otherwise loads the default file if it exists and falls back to
    /// defaults when it does not.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an explicitly requested file fails to load
    /// or any loaded file is invalid.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if path.is_some() || env::var_os(CONFIG_ENV_VAR).is_some() {
            return Self::load(path);
        }
        if Path::new(DEFAULT_CONFIG_NAME).is_file() {
            return Self::load(None);
        }
        Ok(Self::default())
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        Ok(())
    }

    /// Returns the engine configuration described by this file.
    #[must_use]
    pub const fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_input_bytes: self.engine.max_input_bytes,
            hash_algorithm: DEFAULT_HASH_ALGORITHM,
        }
    }
}

/// Engine limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineSection {
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
        }
    }
}

impl EngineSection {
    /// Validates engine configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_input_bytes == 0 {
            return Err(ConfigError::Invalid(
                "engine.max_input_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_input_bytes > MAX_INPUT_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "engine.max_input_bytes must be at most {MAX_INPUT_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Telemetry toggles.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Emit the per-call decision span and counter.
    #[serde(default = "default_telemetry_enabled")]
    pub enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: default_telemetry_enabled(),
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default level filter when `RUST_LOG` is unset.
    #[serde(default)]
    pub level: LogLevel,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Log level filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Warnings and errors.
    Warn,
    /// Informational output.
    #[default]
    Info,
    /// Debug output.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    /// Returns the filter directive for the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Default request body limit.
const fn default_max_input_bytes() -> usize {
    DEFAULT_MAX_INPUT_BYTES
}

/// Telemetry is on unless disabled.
const fn default_telemetry_enabled() -> bool {
    true
}
