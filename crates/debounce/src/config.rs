//! Debounce configuration
//!
//! Loaded from TOML. Every field is optional; missing fields take their
//! defaults:
//!
//! ```toml
//! due_time_ms = 300
//! flush_on_complete = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid debounce config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("quiet period {0:?} is not a whole number of milliseconds")]
    SubMillisecond(Duration),

    #[error("quiet period {0:?} is too long")]
    DueTimeTooLong(Duration),
}

/// Debounce settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Quiet period before a value is emitted (default: 300ms)
    pub due_time_ms: u64,
    /// Emit a value still pending at completion before `Completed`
    /// (default: true)
    pub flush_on_complete: bool,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            due_time_ms: 300,
            flush_on_complete: true,
        }
    }
}

impl DebounceConfig {
    /// Set the quiet period
    pub fn set_due_time(&mut self, due_time: Duration) -> Result<(), ConfigError> {
        self.due_time_ms = Self::checked_millis(due_time)?;
        Ok(())
    }

    /// `due_time` as stored in `due_time_ms`
    ///
    /// Periods that would be truncated or overflow are rejected rather than
    /// rounded.
    pub fn checked_millis(due_time: Duration) -> Result<u64, ConfigError> {
        if due_time.subsec_nanos() % 1_000_000 != 0 {
            return Err(ConfigError::SubMillisecond(due_time));
        }
        u64::try_from(due_time.as_millis()).map_err(|_| ConfigError::DueTimeTooLong(due_time))
    }

    /// The quiet period as a `Duration`
    pub fn due_time(&self) -> Duration {
        Duration::from_millis(self.due_time_ms)
    }

    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}
