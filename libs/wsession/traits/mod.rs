//! # wsession traits
//!
//! Pluggable seams of a session:
//!
//! - **Frame**: the unit carried by a transport
//! - **MessageCodec**: turn frames into typed messages and back
//! - **Transport**: open links to the remote endpoint
//! - **HeaderProvider**: handshake headers for the WebSocket transport
//!
//! ## Example
//!
//! ```rust,ignore
//! use wsession::*;
//!
//! struct Upper;
//!
//! impl MessageCodec<String> for Upper {
//!     fn decode(&self, frame: &Frame) -> Result<String> {
//!         Ok(frame.as_text().unwrap_or_default().to_uppercase())
//!     }
//!
//!     fn encode(&self, message: &String) -> Result<Frame> {
//!         Ok(Frame::Text(message.clone()))
//!     }
//! }
//! ```

pub mod codec;
pub mod error;
pub mod frame;
pub mod headers;
pub mod transport;

// Re-export commonly used types
pub use codec::{FnCodec, JsonCodec, MessageCodec, TextCodec};
pub use error::{ErrorKind, ErrorRecord, Result, SessionError};
pub use frame::Frame;
pub use headers::{HeaderProvider, Headers, StaticHeaders};
pub use transport::{LinkCommand, LinkEndpoint, Transport, TransportEvent, TransportLink, NORMAL_CLOSE_CODE};
