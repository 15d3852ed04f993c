//! Integration tests for realtime connection loss and reconnection.

use std::sync::Arc;
use std::time::Duration;

use plantdesk_core::types::NotificationPriority;
use plantdesk_realtime::{ConnectionState, MemoryTransport};
use tokio::time::sleep;

use crate::helpers::{TestSession, TestStore, notification};

#[tokio::test(start_paused = true)]
async fn test_unreachable_broker_gives_up_after_bounded_attempts() {
    let transport = Arc::new(MemoryTransport::default());
    transport.set_reachable(false);
    let ts = TestSession::start(TestStore::new(true), transport.clone()).await;

    sleep(Duration::from_secs(120)).await;

    // One attempt from session start, then three backoff attempts.
    let attempts = transport.connect_attempts();
    assert_eq!(attempts.len(), 4);
    let gaps: Vec<Duration> = attempts.windows(2).map(|w| w[1] - w[0]).collect();
    assert!(
        gaps.windows(2).all(|g| g[1] > g[0]),
        "gaps not increasing: {gaps:?}"
    );
    assert!(!ts.manager.is_reconnecting());
    assert_eq!(ts.manager.connection_state(), ConnectionState::Unavailable);
    assert_eq!(ts.manager.metrics().connect_attempts, 4);

    // Polling carries on regardless.
    assert_eq!(ts.fixture.api.list_calls(), 5);

    ts.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_dropped_connection_recovers_and_resubscribes() {
    let transport = Arc::new(MemoryTransport::default());
    let ts = TestSession::start(TestStore::new(true), transport.clone()).await;
    assert_eq!(transport.subscriptions().len(), 3);

    transport.drop_connection();
    sleep(Duration::from_secs(5)).await;

    assert!(ts.manager.connection_state().is_connected());
    assert!(!ts.manager.is_reconnecting());
    assert_eq!(transport.connect_attempts().len(), 2);
    assert_eq!(
        transport.subscriptions(),
        vec!["notifications-all", "notifications-sales", "user-u-42"]
    );

    let n = notification("after", 1, NotificationPriority::High);
    ts.fixture.api.insert(n.clone());
    assert!(ts.push("user-u-42", &n).await);
    assert_eq!(ts.state().notifications, vec![n]);

    ts.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_reconnection() {
    let transport = Arc::new(MemoryTransport::default());
    transport.set_reachable(false);
    let ts = TestSession::start(TestStore::new(true), transport.clone()).await;
    assert!(ts.manager.is_reconnecting());

    let manager = ts.manager.clone();
    ts.session.shutdown().await;
    assert!(!manager.is_reconnecting());

    transport.set_reachable(true);
    sleep(Duration::from_secs(60)).await;
    assert_eq!(transport.connect_attempts().len(), 1);
    assert_eq!(manager.connection_state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_push_is_skipped() {
    let transport = Arc::new(MemoryTransport::default());
    let ts = TestSession::start(TestStore::new(true), transport.clone()).await;

    assert!(transport.publish("user-u-42", "notification", "{not json").await);
    assert!(
        transport
            .publish("user-u-42", "pusher:subscription_succeeded", "{}")
            .await
    );
    let n = notification("ok", 1, NotificationPriority::Medium);
    ts.fixture.api.insert(n.clone());
    assert!(ts.push("user-u-42", &n).await);

    assert_eq!(ts.state().notifications, vec![n]);
    let metrics = ts.manager.metrics();
    assert_eq!(metrics.events_received, 3);
    assert_eq!(metrics.decode_failures, 1);
    assert_eq!(metrics.notifications_dispatched, 1);

    ts.session.shutdown().await;
}
