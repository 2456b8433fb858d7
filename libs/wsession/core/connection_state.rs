//! Lock-free connection status
//!
//! The status is written only by the session's event task and read from any
//! thread through the session handle, so it lives in a single `AtomicU8`.

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

/// Connection status of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionStatus {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    Reconnecting = 3,
}

impl ConnectionStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ConnectionStatus::Connecting,
            2 => ConnectionStatus::Connected,
            3 => ConnectionStatus::Reconnecting,
            _ => ConnectionStatus::Disconnected,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Reconnecting => "reconnecting",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic wrapper around [`ConnectionStatus`]
#[derive(Debug)]
pub struct AtomicConnectionStatus {
    inner: AtomicU8,
}

impl AtomicConnectionStatus {
    pub fn new(status: ConnectionStatus) -> Self {
        Self {
            inner: AtomicU8::new(status as u8),
        }
    }

    #[inline]
    pub fn get(&self) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.inner.load(Ordering::Acquire))
    }

    /// Store a new status, returning the previous one
    #[inline]
    pub fn set(&self, status: ConnectionStatus) -> ConnectionStatus {
        ConnectionStatus::from_u8(self.inner.swap(status as u8, Ordering::AcqRel))
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionStatus::Connected
    }

    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.get() == ConnectionStatus::Disconnected
    }

    #[inline]
    pub fn is_reconnecting(&self) -> bool {
        self.get() == ConnectionStatus::Reconnecting
    }
}

impl Default for AtomicConnectionStatus {
    fn default() -> Self {
        Self::new(ConnectionStatus::Disconnected)
    }
}

/// Published reconnect attempt counter
///
/// Mirrors the retry scheduler's counter so the handle can read it without
/// reaching into the event task.
#[derive(Debug, Default)]
pub struct AtomicAttempts {
    inner: AtomicUsize,
}

impl AtomicAttempts {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self) -> usize {
        self.inner.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, attempts: usize) {
        self.inner.store(attempts, Ordering::Release);
    }
}
