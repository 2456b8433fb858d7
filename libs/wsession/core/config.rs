use crate::core::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Session options
///
/// Every field has a default, so a config file only needs the keys it
/// changes:
///
/// ```yaml
/// reconnect: true
/// reconnect_interval_ms: 2000
/// max_retries: 10
/// auto_connect: true
/// event_buffer: 256
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Reconnect automatically after an unexpected close
    pub reconnect: bool,
    /// Delay before each reconnect attempt
    pub reconnect_interval_ms: u64,
    /// Upper bound on consecutive reconnect attempts
    pub max_retries: usize,
    /// Call `connect()` as soon as the session is built
    pub auto_connect: bool,
    /// Undrained `SessionEvent`s kept before newer ones are dropped
    pub event_buffer: usize,
}

/// Default capacity of the session event stream
pub const DEFAULT_EVENT_BUFFER: usize = 1024;

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconnect: true,
            reconnect_interval_ms: 5000,
            max_retries: 5,
            auto_connect: false,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl SessionConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&contents)?;
        info!("Loaded session config from {}", path.display());
        Ok(config)
    }

    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.reconnect, self.reconnect_interval(), self.max_retries)
    }
}
