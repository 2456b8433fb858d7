//! Transport abstraction
//!
//! A [`Transport`] knows how to open a link to the remote endpoint. Opening
//! returns immediately with a [`TransportLink`]; the handshake outcome and
//! everything after it arrives as [`TransportEvent`]s on that link.
//!
//! ```text
//!  Session driver                         Transport task
//! ┌──────────────┐   LinkCommand (out)   ┌──────────────┐
//! │ TransportLink│ ────────────────────> │ LinkEndpoint │ ──> socket
//! │              │ <──────────────────── │              │ <── socket
//! └──────────────┘   TransportEvent (in) └──────────────┘
//! ```
//!
//! Dropping the `TransportLink` detaches the session: later events emitted by
//! the endpoint are discarded and `LinkEndpoint::is_detached` turns true.

use crate::error::{Result, SessionError};
use crate::frame::Frame;
use tokio::sync::mpsc;

/// WebSocket close code for a normal closure
pub const NORMAL_CLOSE_CODE: u16 = 1000;

/// Events delivered by a transport link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed, the link is usable
    Open,
    /// One inbound frame
    Frame(Frame),
    /// Runtime error; a `Closed` event follows when the error is fatal
    Error(String),
    /// The link is gone
    Closed { code: Option<u16>, reason: String },
}

impl TransportEvent {
    /// Closed event with a normal close code
    pub fn normal_close() -> Self {
        TransportEvent::Closed {
            code: Some(NORMAL_CLOSE_CODE),
            reason: String::new(),
        }
    }

    /// Closed event without a close frame (dropped connection)
    pub fn abnormal_close(reason: impl Into<String>) -> Self {
        TransportEvent::Closed {
            code: None,
            reason: reason.into(),
        }
    }
}

/// Commands sent from the session to the transport task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCommand {
    /// Write one frame
    Send(Frame),
    /// Close the underlying connection
    Close,
}

/// Trait for opening transport links
///
/// Implement this trait to plug a different wire into a session. `open` is
/// called once per connection attempt (including reconnections) from within
/// the session's tokio task.
pub trait Transport: Send + Sync + 'static {
    /// Begin opening a new link
    ///
    /// # Returns
    /// * `Ok(link)` - Link constructed; expect `Open` or `Closed` next
    /// * `Err(SessionError)` - Construction failed, nothing was started
    fn open(&self) -> Result<TransportLink>;
}

/// Session side of a transport link
#[derive(Debug)]
pub struct TransportLink {
    events: mpsc::UnboundedReceiver<TransportEvent>,
    commands: mpsc::UnboundedSender<LinkCommand>,
}

impl TransportLink {
    /// Create a connected link/endpoint pair
    pub fn pair() -> (TransportLink, LinkEndpoint) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let link = TransportLink {
            events: event_rx,
            commands: command_tx,
        };
        let endpoint = LinkEndpoint {
            events: event_tx,
            commands: command_rx,
        };
        (link, endpoint)
    }

    /// Wait for the next event; `None` once the endpoint is gone
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    /// Hand one frame to the transport for writing
    pub fn send(&self, frame: Frame) -> Result<()> {
        self.commands
            .send(LinkCommand::Send(frame))
            .map_err(|_| SessionError::ChannelSend("transport link is closed".into()))
    }

    /// Ask the transport to close and detach from its events
    pub fn close(self) {
        let _ = self.commands.send(LinkCommand::Close);
    }
}

/// Transport side of a transport link
#[derive(Debug)]
pub struct LinkEndpoint {
    events: mpsc::UnboundedSender<TransportEvent>,
    commands: mpsc::UnboundedReceiver<LinkCommand>,
}

impl LinkEndpoint {
    /// Deliver an event to the session
    ///
    /// Returns `false` when the session has detached from this link.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Wait for the next command; `None` once the session dropped the link
    pub async fn next_command(&mut self) -> Option<LinkCommand> {
        self.commands.recv().await
    }

    /// Non-blocking variant of [`LinkEndpoint::next_command`]
    pub fn try_next_command(&mut self) -> Option<LinkCommand> {
        self.commands.try_recv().ok()
    }

    /// True once the session no longer listens to this link
    pub fn is_detached(&self) -> bool {
        self.events.is_closed()
    }
}
