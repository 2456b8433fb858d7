//! wsession application crate
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, logging, shutdown)
//! - **wsession**: Session library (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use wsession_app::bin_common::{load_config_from_env, ConfigType};
//! use wsession_app::wsession::SessionConfig;
//! ```

// Re-export workspace libraries for convenience
pub use wsession;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, parse_args, session_url, ConfigType, SESSION_URL_VAR};
    pub use runner::{init_tracing, print_banner, print_shutdown, wait_for_shutdown};
}
