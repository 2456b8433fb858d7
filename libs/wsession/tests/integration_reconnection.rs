//! Integration tests for retry scheduling
//!
//! Covers timer precision, the published `RetryScheduled` events and
//! config-driven sessions. Time is paused throughout.

mod common;

use common::{settle, MockTransport};
use std::time::Duration;
use wsession::{ConnectionStatus, Session, SessionConfig, SessionEvent, TransportEvent};

const INTERVAL: Duration = Duration::from_millis(250);

fn retry_events(session: &Session<serde_json::Value>) -> Vec<(usize, Duration)> {
    let mut scheduled = Vec::new();
    while let Some(event) = session.try_recv_event() {
        if let SessionEvent::RetryScheduled { attempt, delay } = event {
            scheduled.push((attempt, delay));
        }
    }
    scheduled
}

fn session(transport: MockTransport, max_retries: usize) -> Session<serde_json::Value> {
    Session::<serde_json::Value>::builder()
        .transport(transport)
        .reconnect_interval(INTERVAL)
        .max_retries(max_retries)
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_retry_fires_after_interval_not_before() {
    verbose_println!("Testing retry timer precision...");

    let (transport, remote) = MockTransport::new();
    let session = session(transport, 3);

    session.connect();
    settle().await;
    let peer = remote.next_endpoint().unwrap();
    peer.emit(TransportEvent::Open);
    peer.emit(TransportEvent::normal_close());
    settle().await;
    assert_eq!(session.status(), ConnectionStatus::Reconnecting);
    assert_eq!(session.reconnect_attempts(), 0);

    tokio::time::sleep(INTERVAL - Duration::from_millis(20)).await;
    assert_eq!(remote.opens(), 1);
    assert_eq!(session.status(), ConnectionStatus::Reconnecting);

    tokio::time::sleep(Duration::from_millis(20)).await;
    settle().await;
    assert_eq!(remote.opens(), 2);
    assert_eq!(session.reconnect_attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_retry_events_carry_attempt_and_delay() {
    let (transport, remote) = MockTransport::new();
    let session = session(transport, 3);

    session.connect();
    settle().await;
    let peer = remote.next_endpoint().unwrap();
    peer.emit(TransportEvent::Open);
    peer.emit(TransportEvent::abnormal_close("dropped"));
    settle().await;

    for _ in 0..3 {
        tokio::time::sleep(INTERVAL).await;
        settle().await;
        remote
            .next_endpoint()
            .unwrap()
            .emit(TransportEvent::abnormal_close("still down"));
        settle().await;
    }

    assert_eq!(
        retry_events(&session),
        vec![(1, INTERVAL), (2, INTERVAL), (3, INTERVAL)]
    );
    assert_eq!(session.status(), ConnectionStatus::Disconnected);
    assert_eq!(session.reconnect_attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_manual_connect_after_exhaustion_starts_fresh() {
    let (transport, remote) = MockTransport::new();
    let session = session(transport, 1);

    session.connect();
    settle().await;
    remote
        .next_endpoint()
        .unwrap()
        .emit(TransportEvent::abnormal_close("refused"));
    settle().await;
    tokio::time::sleep(INTERVAL).await;
    settle().await;
    remote
        .next_endpoint()
        .unwrap()
        .emit(TransportEvent::abnormal_close("refused"));
    settle().await;
    assert_eq!(session.status(), ConnectionStatus::Disconnected);
    assert_eq!(session.reconnect_attempts(), 1);

    session.connect();
    settle().await;
    assert_eq!(session.status(), ConnectionStatus::Connecting);
    assert_eq!(session.reconnect_attempts(), 0);

    remote
        .next_endpoint()
        .unwrap()
        .emit(TransportEvent::abnormal_close("refused"));
    settle().await;
    assert_eq!(session.status(), ConnectionStatus::Reconnecting);
}

#[tokio::test(start_paused = true)]
async fn test_first_attempt_failure_passes_through_disconnected() {
    let (transport, remote) = MockTransport::new();
    let session = session(transport, 2);

    session.connect();
    settle().await;
    remote
        .next_endpoint()
        .unwrap()
        .emit(TransportEvent::abnormal_close("refused"));
    settle().await;

    let mut statuses = Vec::new();
    while let Some(event) = session.try_recv_event() {
        if let SessionEvent::Status(status) = event {
            statuses.push(status);
        }
    }
    assert_eq!(
        statuses,
        vec![
            ConnectionStatus::Connecting,
            ConnectionStatus::Disconnected,
            ConnectionStatus::Reconnecting,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_session_from_yaml_config() {
    let config = SessionConfig::from_yaml_str(
        "reconnect: true\nreconnect_interval_ms: 50\nmax_retries: 1\nauto_connect: true\n",
    )
    .unwrap();

    let (transport, remote) = MockTransport::new();
    let session = Session::<serde_json::Value>::builder()
        .transport(transport)
        .config(config)
        .build()
        .unwrap();

    settle().await;
    assert_eq!(remote.opens(), 1);

    let peer = remote.next_endpoint().unwrap();
    peer.emit(TransportEvent::Open);
    peer.emit(TransportEvent::normal_close());
    settle().await;
    assert_eq!(session.status(), ConnectionStatus::Reconnecting);

    tokio::time::sleep(Duration::from_millis(50)).await;
    settle().await;
    assert_eq!(remote.opens(), 2);
}
