//! Environment-based configuration.
//!
//! | Variable                 | Default         | Meaning                              |
//! |--------------------------|-----------------|--------------------------------------|
//! | `TODO_STORAGE`           | `memory`        | `memory` or `file`                   |
//! | `TODO_DATA_PATH`         | `todos.json`    | Document used by the `file` backend  |
//! | `RUST_LOG`               | `todomvc=info`  | Tracing filter directives            |
//! | `TODO_SETTLE_TIMEOUT_MS` | `5000`          | How long to wait for pending saves   |
//!
//! # Example
//!
//! ```
//! use todomvc::config::{Config, StorageBackend};
//!
//! let config = Config::from_lookup(|key| match key {
//!     "TODO_STORAGE" => Some("file".to_string()),
//!     _ => None,
//! })?;
//! assert_eq!(config.storage, StorageBackend::File);
//! # Ok::<(), todomvc::config::ConfigError>(())
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

const STORAGE_VAR: &str = "TODO_STORAGE";
const DATA_PATH_VAR: &str = "TODO_DATA_PATH";
const LOG_FILTER_VAR: &str = "RUST_LOG";
const SETTLE_TIMEOUT_VAR: &str = "TODO_SETTLE_TIMEOUT_MS";

/// Configuration error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set to something unusable
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Where todos are persisted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory, lost on exit
    #[default]
    Memory,
    /// A JSON document on disk
    File,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "file" | "json" => Ok(Self::File),
            _ => Err("expected memory or file".to_string()),
        }
    }
}

/// Application configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Persistence backend
    pub storage: StorageBackend,
    /// Document path for [`StorageBackend::File`]
    pub data_path: PathBuf,
    /// Tracing filter directives
    pub log_filter: String,
    /// Upper bound for waiting on in-flight persistence
    pub settle_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageBackend::Memory,
            data_path: PathBuf::from("todos.json"),
            log_filter: "todomvc=info".to_string(),
            settle_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Unset or empty variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(STORAGE_VAR) {
            config.storage = value.parse().map_err(|reason| ConfigError::InvalidValue {
                key: STORAGE_VAR,
                value,
                reason,
            })?;
        }

        if let Some(value) = get(DATA_PATH_VAR) {
            config.data_path = PathBuf::from(value);
        }

        if let Some(value) = get(LOG_FILTER_VAR) {
            config.log_filter = value;
        }

        if let Some(value) = get(SETTLE_TIMEOUT_VAR) {
            let millis: u64 = value.trim().parse().map_err(|error: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: SETTLE_TIMEOUT_VAR,
                    value: value.clone(),
                    reason: error.to_string(),
                }
            })?;
            config.settle_timeout = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero settle timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.settle_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: SETTLE_TIMEOUT_VAR,
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
