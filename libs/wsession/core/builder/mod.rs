pub mod states;

use crate::core::config::SessionConfig;
use crate::core::hooks::SessionHooks;
use crate::core::session::{Session, SessionMessage};
use crate::traits::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use states::*;
use std::sync::Arc;
use std::time::Duration;

/// Type-state builder for [`Session`]
///
/// The transport is required and enforced by the type system; everything
/// else has a default (JSON codec, [`SessionConfig::default`], no hooks).
///
/// # Example
/// ```ignore
/// let session = SessionBuilder::<_, Chat>::new()
///     .transport(WsTransport::new("wss://chat.example.com")?)
///     .reconnect_interval(Duration::from_secs(2))
///     .max_retries(10)
///     .on_open(|| tracing::info!("online"))
///     .on_error(|err| tracing::warn!("{}", err))
///     .build()?;
/// ```
pub struct SessionBuilder<Tr, T>
where
    Tr: TransportState,
{
    _state: TypeState<Tr>,
    transport: Option<Arc<dyn Transport>>,
    codec: Arc<dyn MessageCodec<T>>,
    config: SessionConfig,
    hooks: SessionHooks<T>,
}

impl<T> SessionBuilder<NoTransport, T>
where
    T: SessionMessage + Serialize + DeserializeOwned,
{
    /// Create a builder using the JSON codec
    pub fn new() -> Self {
        Self::with_codec(JsonCodec::<T>::new())
    }
}

impl<T> Default for SessionBuilder<NoTransport, T>
where
    T: SessionMessage + Serialize + DeserializeOwned,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SessionMessage> SessionBuilder<NoTransport, T> {
    /// Create a builder for a message type without serde support
    pub fn with_codec(codec: impl MessageCodec<T>) -> Self {
        Self {
            _state: TypeState::new(),
            transport: None,
            codec: Arc::new(codec),
            config: SessionConfig::default(),
            hooks: SessionHooks::new(),
        }
    }

    pub fn transport(self, transport: impl Transport) -> SessionBuilder<HasTransport, T> {
        SessionBuilder {
            _state: TypeState::new(),
            transport: Some(Arc::new(transport)),
            codec: self.codec,
            config: self.config,
            hooks: self.hooks,
        }
    }
}

// Optional configuration methods
impl<Tr, T> SessionBuilder<Tr, T>
where
    Tr: TransportState,
    T: SessionMessage,
{
    /// Replace the inbound decode / outbound encode strategy
    pub fn codec(mut self, codec: impl MessageCodec<T>) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Replace all options at once, e.g. with a config loaded from YAML
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn reconnect(mut self, enabled: bool) -> Self {
        self.config.reconnect = enabled;
        self
    }

    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.config.reconnect_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn auto_connect(mut self, enabled: bool) -> Self {
        self.config.auto_connect = enabled;
        self
    }

    /// Capacity of the event stream; events beyond it are dropped until
    /// the stream is drained
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.config.event_buffer = capacity;
        self
    }

    /// Invoked on every entry into `Connected`
    pub fn on_open(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.on_open = Some(Arc::new(hook));
        self
    }

    /// Invoked for every decoded message, after it was appended to the log
    pub fn on_message(mut self, hook: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.hooks.on_message = Some(Arc::new(hook));
        self
    }

    /// Invoked whenever a new error becomes the session's last error
    pub fn on_error(mut self, hook: impl Fn(&ErrorRecord) + Send + Sync + 'static) -> Self {
        self.hooks.on_error = Some(Arc::new(hook));
        self
    }

    /// Invoked on entry into `Disconnected` caused by a close
    pub fn on_close(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.hooks.on_close = Some(Arc::new(hook));
        self
    }
}

// Build method - only available once a transport is set
impl<T: SessionMessage> SessionBuilder<HasTransport, T> {
    /// Spawn the session
    ///
    /// Must be called from within a tokio runtime. With `auto_connect`
    /// the first connection attempt is queued immediately.
    pub fn build(self) -> Result<Session<T>> {
        let transport = self
            .transport
            .ok_or_else(|| SessionError::Configuration("transport must be set".into()))?;

        Session::spawn(transport, self.codec, self.config, self.hooks)
    }
}

impl<T> Session<T>
where
    T: SessionMessage + Serialize + DeserializeOwned,
{
    /// Create a new session builder using the JSON codec
    pub fn builder() -> SessionBuilder<NoTransport, T> {
        SessionBuilder::new()
    }
}
