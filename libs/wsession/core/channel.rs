//! Message channel
//!
//! Decodes inbound frames into the shared [`MessageLog`] and gates outbound
//! sends on the connection status. Both directions report failures as
//! [`ErrorRecord`]s instead of raising them; the session decides what to do
//! with the record.

use crate::core::connection_state::ConnectionStatus;
use crate::traits::{ErrorKind, ErrorRecord, Frame, MessageCodec, SessionError, TransportLink};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Append-only log of received messages
///
/// Insertion ordered and unbounded; only [`MessageLog::clear`] removes entries.
#[derive(Debug)]
pub struct MessageLog<T> {
    entries: RwLock<Vec<T>>,
}

impl<T> MessageLog<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, message: T) {
        self.entries.write().push(message);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl<T: Clone> MessageLog<T> {
    /// Copy of the log in arrival order
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.read().clone()
    }
}

impl<T> Default for MessageLog<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Inbound decoding and outbound gating for one session
pub struct MessageChannel<T> {
    codec: Arc<dyn MessageCodec<T>>,
    log: Arc<MessageLog<T>>,
}

impl<T: Clone + 'static> MessageChannel<T> {
    pub fn new(codec: Arc<dyn MessageCodec<T>>, log: Arc<MessageLog<T>>) -> Self {
        Self { codec, log }
    }

    pub fn log(&self) -> &Arc<MessageLog<T>> {
        &self.log
    }

    /// Decode one inbound frame and append it to the log
    ///
    /// Malformed frames are not appended; the returned record has kind
    /// [`ErrorKind::Message`].
    pub fn receive(&self, frame: &Frame) -> Result<T, ErrorRecord> {
        match self.codec.decode(frame) {
            Ok(message) => {
                self.log.push(message.clone());
                Ok(message)
            }
            Err(e) => {
                warn!("Dropping undecodable frame ({} bytes): {}", frame.len(), e);
                Err(ErrorRecord::from_error(ErrorKind::Message, e))
            }
        }
    }

    /// Encode and hand one message to the link
    ///
    /// Only permitted while `Connected`; anything else (including
    /// `Reconnecting`) is rejected without touching the link.
    pub fn send(
        &self,
        status: ConnectionStatus,
        link: Option<&TransportLink>,
        message: &T,
    ) -> Result<(), ErrorRecord> {
        let link = match (status, link) {
            (ConnectionStatus::Connected, Some(link)) => link,
            _ => {
                debug!("Rejecting send while {}", status);
                return Err(ErrorRecord::from_error(
                    ErrorKind::Send,
                    SessionError::NotConnected(status.to_string()),
                ));
            }
        };

        let frame = self
            .codec
            .encode(message)
            .map_err(|e| ErrorRecord::from_error(ErrorKind::Send, e))?;

        link.send(frame)
            .map_err(|e| ErrorRecord::from_error(ErrorKind::Send, e))
    }
}
