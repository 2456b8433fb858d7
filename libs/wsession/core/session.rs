//! Connection controller
//!
//! A [`Session`] is a thin handle. All protocol state is owned by a single
//! driver task, which multiplexes three sources with `tokio::select!`:
//!
//! ```text
//!   handle commands ──┐
//!   link events ──────┼──> driver (one at a time) ──> status / log / last_error
//!   retry timer ──────┘                          └──> hooks + SessionEvent stream
//! ```
//!
//! Because only the driver mutates session state and it handles one input at
//! a time, no two continuations ever run concurrently. Readers go through
//! atomics and `parking_lot` locks and may observe state from any thread.

use crate::core::channel::{MessageChannel, MessageLog};
use crate::core::config::SessionConfig;
use crate::core::connection_state::{AtomicAttempts, AtomicConnectionStatus, ConnectionStatus};
use crate::core::hooks::SessionHooks;
use crate::core::lifecycle::LifecycleGuard;
use crate::core::retry::{RetryDecision, RetryScheduler};
use crate::traits::*;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Bounds required of a session's message type
pub trait SessionMessage: Clone + Send + Sync + std::fmt::Debug + 'static {}

impl<T> SessionMessage for T where T: Clone + Send + Sync + std::fmt::Debug + 'static {}

/// Events published by a session
#[derive(Debug, Clone)]
pub enum SessionEvent<T> {
    /// Status transition (one event per entered state)
    Status(ConnectionStatus),
    /// Reconnect timer armed
    RetryScheduled { attempt: usize, delay: Duration },
    /// Message decoded and appended to the log
    Message(T),
    /// Error recorded as the session's last error
    Error(ErrorRecord),
}

/// Commands from the handle to the driver
#[derive(Debug)]
enum Command<T> {
    Connect,
    Disconnect,
    Send(T),
    Teardown,
}

/// State shared between the handle (read) and the driver (write)
struct SessionShared<T> {
    status: AtomicConnectionStatus,
    attempts: AtomicAttempts,
    last_error: RwLock<Option<ErrorRecord>>,
    log: Arc<MessageLog<T>>,
}

/// Handle to a persistent, self-healing connection session
///
/// Built with [`crate::SessionBuilder`]. Control methods never fail: problems
/// are recorded as [`Session::last_error`] and reported to the `on_error`
/// hook. Dropping the handle tears the session down.
///
/// # Example
/// ```ignore
/// let session = Session::<serde_json::Value>::builder()
///     .transport(WsTransport::new("wss://echo.example.com")?)
///     .max_retries(3)
///     .on_message(|msg| println!("got {}", msg))
///     .build()?;
///
/// session.connect();
/// session.send(serde_json::json!({"text": "hello"}));
/// ```
pub struct Session<T: SessionMessage> {
    shared: Arc<SessionShared<T>>,
    guard: LifecycleGuard,
    command_tx: mpsc::UnboundedSender<Command<T>>,
    event_rx: Receiver<SessionEvent<T>>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
}

impl<T: SessionMessage> Session<T> {
    /// Spawn the driver task and return the handle
    ///
    /// Called by the builder's `build()` method.
    pub(crate) fn spawn(
        transport: Arc<dyn Transport>,
        codec: Arc<dyn MessageCodec<T>>,
        config: SessionConfig,
        hooks: SessionHooks<T>,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            SessionError::Configuration("a session must be built inside a tokio runtime".into())
        })?;

        let log = Arc::new(MessageLog::new());
        let shared = Arc::new(SessionShared {
            status: AtomicConnectionStatus::new(ConnectionStatus::Disconnected),
            attempts: AtomicAttempts::new(),
            last_error: RwLock::new(None),
            log: Arc::clone(&log),
        });
        let guard = LifecycleGuard::new();

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = bounded(config.event_buffer);

        if config.auto_connect {
            debug!("auto_connect enabled, queueing initial connect");
            let _ = command_tx.send(Command::Connect);
        }

        let driver = Driver {
            transport,
            channel: MessageChannel::new(codec, log),
            retry: RetryScheduler::new(config.retry_policy()),
            hooks,
            link: None,
            link_faulted: false,
            shared: Arc::clone(&shared),
            guard: guard.clone(),
            commands: command_rx,
            event_tx,
            events_dropped: 0,
        };

        let task_handle = runtime.spawn(driver.run());

        Ok(Self {
            shared,
            guard,
            command_tx,
            event_rx,
            task_handle: Some(task_handle),
        })
    }

    /// Begin connecting
    ///
    /// No-op while a link is connecting, reconnecting or connected.
    pub fn connect(&self) {
        self.command(Command::Connect);
    }

    /// Close the link and cancel any pending reconnect
    ///
    /// Idempotent: always ends `Disconnected` with zero attempts.
    pub fn disconnect(&self) {
        self.command(Command::Disconnect);
    }

    /// Send one message (fire-and-forget)
    ///
    /// Rejected with a `Send` error record unless the session is connected.
    pub fn send(&self, message: T) {
        self.command(Command::Send(message));
    }

    /// Empty the received-message log
    ///
    /// Does not touch connection or retry state.
    pub fn clear_messages(&self) {
        self.shared.log.clear();
    }

    fn command(&self, command: Command<T>) {
        if self.command_tx.send(command).is_err() {
            debug!("Session driver has exited, command dropped");
        }
    }

    /// Current connection status
    #[inline]
    pub fn status(&self) -> ConnectionStatus {
        self.shared.status.get()
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.shared.status.is_connected()
    }

    #[inline]
    pub fn is_reconnecting(&self) -> bool {
        self.shared.status.is_reconnecting()
    }

    /// Reconnect attempts since the last successful open
    #[inline]
    pub fn reconnect_attempts(&self) -> usize {
        self.shared.attempts.get()
    }

    /// Received messages in arrival order
    pub fn messages(&self) -> Vec<T> {
        self.shared.log.snapshot()
    }

    pub fn message_count(&self) -> usize {
        self.shared.log.len()
    }

    /// Most recent error, cleared by the next successful open
    pub fn last_error(&self) -> Option<ErrorRecord> {
        self.shared.last_error.read().clone()
    }

    /// False once the session has been torn down
    pub fn is_active(&self) -> bool {
        self.guard.is_active()
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<SessionEvent<T>> {
        self.event_rx.try_recv().ok()
    }

    /// Receive an event (blocking)
    ///
    /// Do not call from the runtime thread that drives the session.
    pub fn recv_event(&self) -> std::result::Result<SessionEvent<T>, crossbeam_channel::RecvError> {
        self.event_rx.recv()
    }

    /// Receive an event, waiting at most `timeout` (blocking)
    pub fn recv_event_timeout(
        &self,
        timeout: Duration,
    ) -> std::result::Result<SessionEvent<T>, RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }

    /// A receiver for the event stream, e.g. to hand to another thread
    ///
    /// The stream holds at most `event_buffer` events; newer ones are
    /// dropped while it is full.
    pub fn events(&self) -> Receiver<SessionEvent<T>> {
        self.event_rx.clone()
    }

    /// Tear the session down and wait for the driver to finish
    ///
    /// Runs disconnect semantics (timer cancelled, link closed) and then
    /// deactivates the lifecycle guard. No hook fires during or after
    /// teardown.
    pub async fn shutdown(mut self) -> Result<()> {
        info!("Shutting down session");
        self.command(Command::Teardown);

        if let Some(handle) = self.task_handle.take() {
            handle
                .await
                .map_err(|e| SessionError::Configuration(format!("driver task failed: {}", e)))?;
        }
        Ok(())
    }
}

impl<T: SessionMessage> Drop for Session<T> {
    fn drop(&mut self) {
        if self.task_handle.take().is_some() {
            debug!("Session handle dropped, requesting teardown");
            self.command(Command::Teardown);
        }
    }
}

/// What woke the driver up
enum Step<T> {
    Command(Option<Command<T>>),
    Link(Option<TransportEvent>),
    RetryDue(usize),
}

/// Owner of all mutable session state; runs on its own task
struct Driver<T: SessionMessage> {
    transport: Arc<dyn Transport>,
    channel: MessageChannel<T>,
    retry: RetryScheduler,
    hooks: SessionHooks<T>,
    link: Option<TransportLink>,
    /// An error event was already recorded for the current link
    link_faulted: bool,
    shared: Arc<SessionShared<T>>,
    guard: LifecycleGuard,
    commands: mpsc::UnboundedReceiver<Command<T>>,
    event_tx: Sender<SessionEvent<T>>,
    /// Events dropped since the stream was last found with room
    events_dropped: usize,
}

impl<T: SessionMessage> Driver<T> {
    async fn run(mut self) {
        debug!("Session driver started");

        loop {
            // Commands first, so a queued teardown beats any pending link event
            let step = tokio::select! {
                biased;
                command = self.commands.recv() => Step::Command(command),
                event = next_link_event(&mut self.link) => Step::Link(event),
                attempt = self.retry.expired() => Step::RetryDue(attempt),
            };

            if !self.guard.is_active() {
                debug!("Session no longer active, driver exiting");
                break;
            }

            match step {
                Step::Command(Some(Command::Connect)) => self.connect(),
                Step::Command(Some(Command::Disconnect)) => self.disconnect(true),
                Step::Command(Some(Command::Send(message))) => self.send(message),
                Step::Command(Some(Command::Teardown)) | Step::Command(None) => {
                    self.teardown();
                    break;
                }
                Step::Link(event) => self.on_link_event(event),
                Step::RetryDue(attempt) => self.on_retry_due(attempt),
            }
        }

        debug!("Session driver exiting");
    }

    fn connect(&mut self) {
        let status = self.shared.status.get();
        if status != ConnectionStatus::Disconnected {
            debug!("connect() ignored while {}", status);
            return;
        }
        // A caller-initiated connect starts a fresh retry budget
        self.retry.reset();
        self.shared.attempts.set(0);
        self.open_link();
    }

    /// Internal connect path, shared by `connect()` and retry expiry
    fn open_link(&mut self) {
        self.transition(ConnectionStatus::Connecting);
        self.link_faulted = false;

        match self.transport.open() {
            Ok(link) => {
                debug!("Transport link constructed, awaiting open");
                self.link = Some(link);
            }
            Err(e) => {
                error!("Failed to open transport: {}", e);
                self.report(ErrorRecord::from_error(ErrorKind::Connection, e));
                self.on_link_lost();
            }
        }
    }

    fn disconnect(&mut self, notify: bool) {
        if self.retry.cancel() {
            debug!("Cancelled pending reconnect");
        }
        self.retry.reset();
        self.shared.attempts.set(0);

        if let Some(link) = self.link.take() {
            link.close();
        }

        let status = self.shared.status.get();
        if status == ConnectionStatus::Disconnected {
            debug!("disconnect() on an already disconnected session");
            return;
        }

        info!("Disconnecting session");
        self.transition(ConnectionStatus::Disconnected);
        // Only a link that actually opened has something to close
        if notify && status == ConnectionStatus::Connected {
            self.hooks.close();
        }
    }

    fn teardown(&mut self) {
        info!("Tearing down session");
        self.disconnect(false);
        self.guard.deactivate();
    }

    fn send(&mut self, message: T) {
        let status = self.shared.status.get();
        if let Err(record) = self.channel.send(status, self.link.as_ref(), &message) {
            self.report(record);
        }
    }

    fn on_link_event(&mut self, event: Option<TransportEvent>) {
        if !self.guard.is_active() {
            return;
        }

        match event {
            Some(TransportEvent::Open) => self.on_open(),
            Some(TransportEvent::Frame(frame)) => self.on_frame(frame),
            Some(TransportEvent::Error(text)) => self.on_error(text),
            Some(TransportEvent::Closed { code, reason }) => self.on_closed(code, reason),
            None => self.on_closed(None, "transport ended without close".to_string()),
        }
    }

    fn on_open(&mut self) {
        let status = self.shared.status.get();
        if status != ConnectionStatus::Connecting {
            warn!("Ignoring open event while {}", status);
            return;
        }

        self.retry.reset();
        self.shared.attempts.set(0);
        *self.shared.last_error.write() = None;

        info!("Session connected");
        self.transition(ConnectionStatus::Connected);
        self.hooks.open();
    }

    fn on_frame(&mut self, frame: Frame) {
        match self.channel.receive(&frame) {
            Ok(message) => {
                self.hooks.message(&message);
                self.publish(SessionEvent::Message(message));
            }
            Err(record) => self.report(record),
        }
    }

    fn on_error(&mut self, text: String) {
        error!("Transport error: {}", text);
        self.link_faulted = true;
        self.report(ErrorRecord::from_error(
            ErrorKind::Connection,
            SessionError::Transport(text),
        ));

        // A handshake that errored will never open; do not wait for its close
        if self.shared.status.get() == ConnectionStatus::Connecting {
            if let Some(link) = self.link.take() {
                link.close();
            }
            self.on_link_lost();
        }
    }

    fn on_closed(&mut self, code: Option<u16>, reason: String) {
        info!("Transport closed (code: {:?}, reason: '{}')", code, reason);
        self.link = None;

        if code != Some(NORMAL_CLOSE_CODE) && !self.link_faulted {
            self.report(ErrorRecord::from_error(
                ErrorKind::Connection,
                SessionError::ConnectionClosed(match code {
                    Some(code) => format!("code {}: {}", code, reason),
                    None => reason,
                }),
            ));
        }

        self.on_link_lost();
    }

    /// The link went away without an explicit `disconnect()`
    fn on_link_lost(&mut self) {
        // A failed retry attempt stays visibly in Reconnecting
        let retry_in_flight = self.shared.status.get() == ConnectionStatus::Connecting
            && self.retry.attempts() > 0;

        match self.retry.on_disconnect() {
            RetryDecision::Scheduled { attempt, delay } => {
                if !retry_in_flight {
                    self.enter_disconnected();
                }
                info!("Reconnecting in {:?} (attempt {})", delay, attempt);
                self.transition(ConnectionStatus::Reconnecting);
                self.publish(SessionEvent::RetryScheduled { attempt, delay });
            }
            RetryDecision::Disabled => {
                debug!("Reconnect disabled, staying disconnected");
                self.enter_disconnected();
            }
            RetryDecision::Exhausted { attempts } => {
                warn!("Reconnection attempts exhausted after {} attempts", attempts);
                self.enter_disconnected();
            }
        }
    }

    fn enter_disconnected(&mut self) {
        self.transition(ConnectionStatus::Disconnected);
        self.hooks.close();
    }

    fn on_retry_due(&mut self, attempt: usize) {
        if !self.guard.is_active() {
            return;
        }
        self.shared.attempts.set(attempt);

        let status = self.shared.status.get();
        if status != ConnectionStatus::Reconnecting {
            warn!("Retry timer fired while {}, ignoring", status);
            return;
        }

        info!("Reconnect attempt {}", attempt);
        self.open_link();
    }

    fn report(&mut self, record: ErrorRecord) {
        *self.shared.last_error.write() = Some(record.clone());
        self.hooks.error(&record);
        self.publish(SessionEvent::Error(record));
    }

    fn transition(&mut self, status: ConnectionStatus) {
        let previous = self.shared.status.set(status);
        debug!("Status {} -> {}", previous, status);
        self.publish(SessionEvent::Status(status));
    }

    /// Offer an event to the stream without ever blocking the driver
    fn publish(&mut self, event: SessionEvent<T>) {
        match self.event_tx.try_send(event) {
            Ok(()) => {
                if self.events_dropped > 0 {
                    debug!("Event stream drained, {} events were dropped", self.events_dropped);
                    self.events_dropped = 0;
                }
            }
            Err(TrySendError::Full(_)) => {
                if self.events_dropped == 0 {
                    warn!("Event stream full, dropping events until it is drained");
                }
                self.events_dropped += 1;
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// Next event of the current link; pending forever without a link
async fn next_link_event(link: &mut Option<TransportLink>) -> Option<TransportEvent> {
    match link {
        Some(link) => link.next_event().await,
        None => std::future::pending().await,
    }
}
