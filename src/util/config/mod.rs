//! Interpreter configuration
//!
//! Configuration hierarchy:
//!
//! ```text
//! Priority (high → low):
//! 1. Environment variables (EVENTVM_FREEZE_LIMIT, EVENTVM_MAX_CALL_DEPTH)
//! 2. Config file (RON)
//! 3. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use eventvm::util::config::InterpreterConfig;
//!
//! let config = InterpreterConfig::default();
//! assert_eq!(config.max_call_depth, 100);
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment override for the freeze-watchdog ceiling
pub const ENV_FREEZE_LIMIT: &str = "EVENTVM_FREEZE_LIMIT";
/// Environment override for the call-depth ceiling
pub const ENV_MAX_CALL_DEPTH: &str = "EVENTVM_MAX_CALL_DEPTH";

/// Interpreter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// Maximum nested Common Event depth; creating a frame at this depth fails
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
    /// Dispatches allowed per host frame before the interpreter yields
    #[serde(default = "default_freeze_limit")]
    pub freeze_limit: u32,
    /// Frames used by Fadeout / Fadein Screen
    #[serde(default = "default_fade_speed")]
    pub fade_speed: i64,
    /// Log every dispatched command at debug level
    #[serde(default)]
    pub trace_commands: bool,
}

fn default_max_call_depth() -> usize {
    100
}

fn default_freeze_limit() -> u32 {
    100_000
}

fn default_fade_speed() -> i64 {
    24
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_call_depth: default_max_call_depth(),
            freeze_limit: default_freeze_limit(),
            fade_speed: default_fade_speed(),
            trace_commands: false,
        }
    }
}

impl InterpreterConfig {
    /// Parse a RON document
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        ron::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply environment overrides
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(raw) = std::env::var(ENV_FREEZE_LIMIT) {
            self.freeze_limit = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_FREEZE_LIMIT,
                value: raw.clone(),
            })?;
        }
        if let Ok(raw) = std::env::var(ENV_MAX_CALL_DEPTH) {
            self.max_call_depth = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_MAX_CALL_DEPTH,
                value: raw.clone(),
            })?;
        }
        Ok(self)
    }
}

/// Load configuration from a RON file.
/// Returns defaults if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<InterpreterConfig, ConfigError> {
    if !path.exists() {
        return InterpreterConfig::default().with_env_overrides();
    }
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    InterpreterConfig::from_ron(&content)?.with_env_overrides()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(String),

    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: &'static str, value: String },
}
