//! Common test utilities for wsession integration tests
//!
//! - `MockTransport`: a scripted transport whose links are driven by the test
//! - `MockWsServer`: a real WebSocket echo server for end-to-end tests

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use wsession::{
    ConnectionStatus, LinkEndpoint, Result, Session, SessionError, SessionEvent, SessionMessage,
    Transport, TransportLink,
};

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

#[derive(Default)]
struct MockState {
    endpoints: VecDeque<LinkEndpoint>,
    opens: usize,
    refusals: usize,
}

/// Transport whose links are handed to the test instead of a socket
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

/// Test-side control of a [`MockTransport`]
#[derive(Clone)]
pub struct MockRemote {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> (Self, MockRemote) {
        let transport = Self::default();
        let remote = MockRemote {
            state: Arc::clone(&transport.state),
        };
        (transport, remote)
    }
}

impl Transport for MockTransport {
    fn open(&self) -> Result<TransportLink> {
        let mut state = self.state.lock();
        state.opens += 1;

        if state.refusals > 0 {
            state.refusals -= 1;
            return Err(SessionError::Transport("mock transport refused".into()));
        }

        let (link, endpoint) = TransportLink::pair();
        state.endpoints.push_back(endpoint);
        Ok(link)
    }
}

impl MockRemote {
    /// Number of `open()` calls so far, refused ones included
    pub fn opens(&self) -> usize {
        self.state.lock().opens
    }

    /// Endpoint of the oldest link not yet taken by the test
    pub fn next_endpoint(&self) -> Option<LinkEndpoint> {
        self.state.lock().endpoints.pop_front()
    }

    /// Make the next `count` calls to `open()` fail at construction
    pub fn refuse_next(&self, count: usize) {
        self.state.lock().refusals = count;
    }
}

/// Let the session's driver run until it is idle
///
/// With a paused clock the runtime only advances time once every task is
/// idle, so a short sleep drains all pending work first.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// All status transitions published so far, in order
pub fn drain_statuses<T: SessionMessage>(session: &Session<T>) -> Vec<ConnectionStatus> {
    let mut statuses = Vec::new();
    while let Some(event) = session.try_recv_event() {
        if let SessionEvent::Status(status) = event {
            statuses.push(status);
        }
    }
    statuses
}

/// Poll `condition` on real time until it holds or `timeout` elapses
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Shared counter for hook invocations
#[derive(Clone, Default)]
pub struct HookCounter(Arc<AtomicUsize>);

impl HookCounter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A simple WebSocket echo server for testing
pub struct MockWsServer {
    pub addr: SocketAddr,
    shutdown: Arc<Notify>,
}

impl MockWsServer {
    /// Create and start a new echo server
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, _)) => {
                                let shutdown = shutdown_clone.clone();
                                tokio::spawn(async move {
                                    Self::handle_connection(stream, shutdown).await;
                                });
                            }
                            Err(e) => {
                                eprintln!("Accept error: {}", e);
                                break;
                            }
                        }
                    }
                    _ = shutdown_clone.notified() => {
                        break;
                    }
                }
            }
        });

        Self { addr, shutdown }
    }

    async fn handle_connection(stream: tokio::net::TcpStream, shutdown: Arc<Notify>) {
        use futures::{SinkExt, StreamExt};
        use tokio_tungstenite::accept_async;
        use tokio_tungstenite::tungstenite::Message;

        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                eprintln!("WebSocket handshake failed: {}", e);
                return;
            }
        };

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(msg)) => {
                            if msg.is_text() && msg.to_text().map(|t| t == "\"close-me\"").unwrap_or(false) {
                                // Scripted server-initiated close
                                let _ = write.send(Message::Close(None)).await;
                                break;
                            } else if msg.is_text() || msg.is_binary() {
                                // Echo the message back
                                if write.send(msg).await.is_err() {
                                    break;
                                }
                            } else if msg.is_close() {
                                break;
                            }
                        }
                        Some(Err(_)) | None => break,
                    }
                }
                _ = shutdown.notified() => {
                    break;
                }
            }
        }
    }

    /// Get the WebSocket URL for this server
    pub fn ws_url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Shutdown the server
    pub fn shutdown(&self) {
        self.shutdown.notify_waiters();
    }
}

impl Drop for MockWsServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
