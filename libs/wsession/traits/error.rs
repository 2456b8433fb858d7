use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Main error type for wsession
#[derive(Error, Debug)]
pub enum SessionError {
    /// Transport level failure (handshake, socket I/O)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Connection closed before or while in use
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// The target URL could not be turned into a handshake request
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Frame could not be decoded into a message
    #[error("Decode error: {0}")]
    Decode(String),

    /// Message could not be encoded into a frame
    #[error("Encode error: {0}")]
    Encode(String),

    /// Outbound send attempted while the session is not connected
    #[error("Not connected (status: {0})")]
    NotConnected(String),

    /// Channel send error
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for wsession operations
pub type Result<T> = std::result::Result<T, SessionError>;

/// Category of a recorded session error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Link construction failure, abnormal close, runtime error event
    Connection,
    /// Inbound frame failed to decode
    Message,
    /// Outbound send rejected or failed
    Send,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Message => "message",
            ErrorKind::Send => "send",
        };
        f.write_str(name)
    }
}

/// The most recent error observed by a session
///
/// Errors are reported, not raised: the driver stores the latest one as the
/// session's `last_error` and hands it to the `on_error` hook.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub text: String,
    pub cause: Option<Arc<dyn std::error::Error + Send + Sync>>,
    pub observed_at: DateTime<Utc>,
}

impl ErrorRecord {
    /// Record an error with a human readable text and no underlying cause
    pub fn new(kind: ErrorKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            cause: None,
            observed_at: Utc::now(),
        }
    }

    /// Record an error caused by a [`SessionError`]
    pub fn from_error(kind: ErrorKind, error: SessionError) -> Self {
        Self {
            kind,
            text: error.to_string(),
            cause: Some(Arc::new(error)),
            observed_at: Utc::now(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_from_error_keeps_cause() {
        let record = ErrorRecord::from_error(
            ErrorKind::Send,
            SessionError::NotConnected("disconnected".into()),
        );

        assert_eq!(record.kind, ErrorKind::Send);
        assert_eq!(record.text, "Not connected (status: disconnected)");
        assert!(record.cause.is_some());
        assert_eq!(record.to_string(), "send error: Not connected (status: disconnected)");
    }

    #[test]
    fn test_plain_record_has_no_cause() {
        let record = ErrorRecord::new(ErrorKind::Connection, "closed");
        assert!(record.cause.is_none());
        assert!(record.observed_at <= Utc::now());
    }
}
