//! Integration tests for a running notification session over the in-memory broker.

use std::sync::Arc;
use std::time::Duration;

use plantdesk_core::types::{NotificationId, NotificationPriority};
use plantdesk_notify::ToastVariant;
use plantdesk_realtime::MemoryTransport;
use tokio::time::sleep;

use crate::helpers::{TestSession, TestStore, notification, settle};

#[tokio::test(start_paused = true)]
async fn test_session_polls_on_configured_intervals() {
    let ts = TestSession::start(TestStore::new(true), Arc::new(MemoryTransport::default())).await;
    let api = ts.fixture.api.clone();

    assert_eq!(api.list_calls(), 1);
    assert_eq!(api.count_calls(), 1);

    sleep(Duration::from_secs(15)).await;
    assert_eq!(api.list_calls(), 1);
    assert_eq!(api.count_calls(), 2);

    sleep(Duration::from_secs(15)).await;
    assert_eq!(api.list_calls(), 2);
    assert_eq!(api.count_calls(), 3);

    ts.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_session_subscribes_user_role_and_broadcast_channels() {
    let ts = TestSession::start(TestStore::new(true), Arc::new(MemoryTransport::default())).await;

    assert_eq!(
        ts.transport.subscriptions(),
        vec!["notifications-all", "notifications-sales", "user-u-42"]
    );
    assert!(ts.manager.connection_state().is_connected());

    let role = notification("r1", 1, NotificationPriority::Low);
    let broadcast = notification("b1", 2, NotificationPriority::Low);
    ts.fixture.api.insert(role.clone());
    ts.fixture.api.insert(broadcast.clone());
    assert!(ts.push("notifications-sales", &role).await);
    assert!(ts.push("notifications-all", &broadcast).await);
    assert!(
        !ts.push(
            "notifications-production-manager",
            &notification("x1", 3, NotificationPriority::Low)
        )
        .await
    );

    let ids: Vec<_> = ts
        .state()
        .notifications
        .iter()
        .map(|n| n.id.as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["b1", "r1"]);

    ts.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_push_then_poll_reconciliation() {
    let ts = TestSession::start(TestStore::new(true), Arc::new(MemoryTransport::default())).await;
    let api = ts.fixture.api.clone();
    assert_eq!(ts.state().unread_count, 0);

    let n1 = notification("n1", 0, NotificationPriority::Urgent);
    api.insert(n1.clone());
    assert!(ts.push("user-u-42", &n1).await);

    // The push invalidates both polls, which refetch right away.
    assert_eq!(api.list_calls(), 2);
    assert_eq!(api.count_calls(), 2);

    let state = ts.state();
    assert_eq!(state.notifications, vec![n1]);
    assert_eq!(state.unread_count, 1);
    assert_eq!(ts.fixture.audio.attempts(), 1);
    let toasts = ts.fixture.toasts.shown();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].variant, ToastVariant::Destructive);

    sleep(Duration::from_secs(15)).await;
    assert_eq!(ts.state().unread_count, 1);
    assert_eq!(ts.fixture.audio.attempts(), 1);

    ts.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_missed_push_is_caught_by_count_poll() {
    let ts = TestSession::start(TestStore::new(true), Arc::new(MemoryTransport::default())).await;
    let api = ts.fixture.api.clone();

    api.insert(notification("n1", 1, NotificationPriority::Medium));
    api.insert(notification("n2", 2, NotificationPriority::Medium));

    sleep(Duration::from_secs(15)).await;
    assert_eq!(ts.state().unread_count, 2);
    assert_eq!(ts.fixture.audio.attempts(), 1);

    sleep(Duration::from_secs(15)).await;
    let state = ts.state();
    assert_eq!(state.notifications.len(), 2);
    assert_eq!(state.unread_count, 2);
    assert_eq!(ts.fixture.audio.attempts(), 1);

    ts.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_disabled_sound_stays_silent_for_a_whole_session() {
    let ts = TestSession::start(TestStore::new(false), Arc::new(MemoryTransport::default())).await;
    let api = ts.fixture.api.clone();

    for i in 0..5 {
        let n = notification(&format!("n{i}"), i, NotificationPriority::Urgent);
        api.insert(n.clone());
        ts.push("user-u-42", &n).await;
    }
    api.insert(notification("missed", 10, NotificationPriority::High));
    sleep(Duration::from_secs(30)).await;

    assert_eq!(ts.state().unread_count, 6);
    assert_eq!(ts.fixture.audio.attempts(), 0);
    assert_eq!(ts.fixture.toasts.shown().len(), 5);

    ts.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_mark_as_read_converges_with_server() {
    let fixture = TestStore::new(true);
    fixture.api.insert(notification("n1", 1, NotificationPriority::Medium));
    fixture.api.insert(notification("n2", 2, NotificationPriority::Medium));
    let ts = TestSession::start(fixture, Arc::new(MemoryTransport::default())).await;
    assert_eq!(ts.state().unread_count, 2);

    ts.fixture
        .store
        .mark_as_read(&NotificationId::new("n1"))
        .await
        .unwrap();
    settle().await;

    let state = ts.state();
    assert_eq!(state.unread_count, 1);
    assert_eq!(ts.fixture.api.server_unread(), 1);
    let n1 = state
        .notifications
        .iter()
        .find(|n| n.id.as_str() == "n1")
        .unwrap();
    assert!(n1.is_read_by_user);

    ts.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_consecutive_poll_failures_toast_once_per_poll_and_keep_cache() {
    let fixture = TestStore::new(true);
    fixture.api.insert(notification("n1", 1, NotificationPriority::Low));
    let ts = TestSession::start(fixture, Arc::new(MemoryTransport::default())).await;
    assert_eq!(ts.state().notifications.len(), 1);

    ts.fixture.api.fail_fetches(true);
    sleep(Duration::from_secs(20)).await;
    // The count poll fails first and toasts once.
    assert!(ts.state().count_error.is_some());
    assert_eq!(ts.fixture.toasts.shown().len(), 1);

    sleep(Duration::from_secs(25)).await;
    let state = ts.state();
    assert_eq!(state.notifications.len(), 1);
    assert!(state.list_error.is_some());
    let titles: Vec<String> = ts
        .fixture
        .toasts
        .shown()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(
        titles,
        vec!["Failed to load unread count", "Failed to load notifications"]
    );

    ts.fixture.api.fail_fetches(false);
    sleep(Duration::from_secs(30)).await;
    assert!(ts.state().last_error().is_none());
    assert_eq!(ts.fixture.toasts.shown().len(), 2);

    ts.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_poll_only_session_without_realtime() {
    let options = plantdesk_notify::session::SessionOptions {
        realtime: false,
        ..TestSession::options()
    };
    let ts = TestSession::start_with(
        TestStore::new(true),
        Arc::new(MemoryTransport::default()),
        options,
    )
    .await;

    assert!(ts.transport.connect_attempts().is_empty());
    assert!(ts.manager.channels().is_empty());

    ts.fixture
        .api
        .insert(notification("n1", 1, NotificationPriority::High));
    sleep(Duration::from_secs(30)).await;
    assert_eq!(ts.state().notifications.len(), 1);

    ts.session.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_resets_store_and_stops_polling() {
    let fixture = TestStore::new(true);
    fixture.api.insert(notification("n1", 1, NotificationPriority::Low));
    let ts = TestSession::start(fixture, Arc::new(MemoryTransport::default())).await;
    assert_eq!(ts.state().notifications.len(), 1);

    let TestSession {
        fixture,
        transport,
        manager,
        session,
    } = ts;
    let epoch = fixture.store.epoch();
    session.shutdown().await;

    assert_eq!(fixture.store.epoch(), epoch + 1);
    assert!(fixture.state().notifications.is_empty());
    assert_eq!(fixture.state().unread_count, 0);
    assert!(manager.channels().is_empty());
    assert!(transport.subscriptions().is_empty());

    let calls = (fixture.api.list_calls(), fixture.api.count_calls());
    sleep(Duration::from_secs(120)).await;
    assert_eq!((fixture.api.list_calls(), fixture.api.count_calls()), calls);
}

#[tokio::test(start_paused = true)]
async fn test_toggling_sound_mid_session_silences_pushes() {
    let ts = TestSession::start(TestStore::new(true), Arc::new(MemoryTransport::default())).await;

    assert!(!ts.fixture.store.toggle_sound());
    assert!(!ts.fixture.preference.is_enabled());
    assert!(!ts.state().sound_enabled);

    let n = notification("quiet", 1, NotificationPriority::Urgent);
    ts.fixture.api.insert(n.clone());
    assert!(ts.push("user-u-42", &n).await);

    assert_eq!(ts.state().unread_count, 1);
    assert_eq!(ts.fixture.audio.attempts(), 0);

    ts.session.shutdown().await;
}
