//! # wsession core
//!
//! The session machinery, leaf to root:
//!
//! - [`lifecycle`]: guard that vetoes work after teardown
//! - [`retry`]: reconnect timer and attempt counter
//! - [`channel`]: inbound decoding into the message log, outbound gating
//! - [`session`]: the connection controller and its public handle
//!
//! ## Example
//!
//! ```rust,ignore
//! use wsession::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let session = wsession::builder::<serde_json::Value>()
//!         .transport(WsTransport::new("wss://api.example.com/stream")?)
//!         .reconnect_interval(Duration::from_secs(5))
//!         .max_retries(5)
//!         .on_message(|msg| println!("Message: {}", msg))
//!         .build()?;
//!
//!     session.connect();
//!
//!     while let Ok(event) = session.recv_event() {
//!         println!("Event: {:?}", event);
//!     }
//!
//!     session.shutdown().await
//! }
//! ```

pub mod builder;
pub mod channel;
pub mod config;
pub mod connection_state;
pub mod hooks;
pub mod lifecycle;
pub mod retry;
pub mod session;
pub mod ws_transport;

// Re-export main types
pub use builder::{states, SessionBuilder};
pub use channel::{MessageChannel, MessageLog};
pub use config::{ConfigError, SessionConfig};
pub use connection_state::{AtomicAttempts, AtomicConnectionStatus, ConnectionStatus};
pub use hooks::SessionHooks;
pub use lifecycle::LifecycleGuard;
pub use retry::{RetryDecision, RetryPolicy, RetryScheduler};
pub use session::{Session, SessionEvent, SessionMessage};
pub use ws_transport::WsTransport;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Create a new session builder using the JSON codec
///
/// This is the main entry point for creating sessions.
pub fn builder<T>() -> SessionBuilder<states::NoTransport, T>
where
    T: SessionMessage + Serialize + DeserializeOwned,
{
    SessionBuilder::new()
}
