//! # wsession
//!
//! A persistent, message-oriented WebSocket session with automatic
//! reconnection, bounded retry and safe teardown.
//!
//! ## Features
//!
//! - **Single event task**: commands, link events and the retry timer are
//!   handled one at a time, so session state never races
//! - **Bounded retry**: constant interval, attempt counter reset on every open
//! - **Typed messages**: pluggable codecs, JSON by default
//! - **Reported, not raised**: failures become the session's `last_error`
//! - **Safe teardown**: a lifecycle guard silences every continuation after
//!   shutdown; timers and sockets never outlive the session

pub mod traits;
pub mod core;

// Re-export all traits
pub use traits::*;

// Re-export core session functionality
pub use self::core::{
    builder, channel, config, connection_state, lifecycle, retry, session,
    builder::{states, SessionBuilder},
    channel::MessageLog,
    config::{ConfigError, SessionConfig},
    connection_state::ConnectionStatus,
    lifecycle::LifecycleGuard,
    retry::{RetryDecision, RetryPolicy},
    session::{Session, SessionEvent, SessionMessage},
    ws_transport::WsTransport,
};

// Convenience function
pub use self::core::builder as session_builder;

/// Type alias for Result with SessionError
pub type Result<T> = std::result::Result<T, traits::SessionError>;
