//! CLI utilities for binaries
//!
//! Handles configuration loading and environment variables
//! for all binary executables.

use std::path::PathBuf;

/// Environment variable holding the WebSocket URL to connect to
pub const SESSION_URL_VAR: &str = "SESSION_URL";

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Session configuration (session.yaml)
    Session,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Session => "config/session.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        "SESSION_CONFIG_PATH"
    }
}

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use wsession_app::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Session);
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

/// Resolve the target URL: first CLI argument, then `SESSION_URL`
pub fn session_url(args: &[String]) -> Option<String> {
    args.first()
        .cloned()
        .or_else(|| std::env::var(SESSION_URL_VAR).ok())
}
