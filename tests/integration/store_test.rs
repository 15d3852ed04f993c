//! Integration tests for the notification store's reconciliation rules.

use plantdesk_core::types::{NotificationId, NotificationPriority};
use plantdesk_notify::{FeedStatus, ToastVariant};

use crate::helpers::{TestStore, notification, settle};

fn assert_newest_first(fixture: &TestStore) {
    let state = fixture.state();
    for pair in state.notifications.windows(2) {
        assert!(
            pair[0].created_at > pair[1].created_at,
            "{} is not newer than {}",
            pair[0].id,
            pair[1].id
        );
    }
}

#[tokio::test]
async fn test_unread_count_never_drops_below_zero() {
    let fixture = TestStore::new(true);
    fixture.api.insert(notification("n1", 1, NotificationPriority::Medium));
    fixture
        .store
        .fetch_notifications(fixture.store.list_params())
        .await
        .unwrap();
    assert_eq!(fixture.state().unread_count, 1);

    for id in ["n1", "n1", "missing", "other", "n1"] {
        let _ = fixture.store.mark_as_read(&NotificationId::new(id)).await;
        assert_eq!(fixture.state().unread_count, 0);
    }

    fixture.api.fail_mutations(true);
    for id in ["n1", "missing"] {
        assert!(fixture.store.mark_as_read(&NotificationId::new(id)).await.is_err());
        assert_eq!(fixture.state().unread_count, 0);
    }
}

#[tokio::test]
async fn test_list_stays_newest_first_across_fetches_and_pushes() {
    let fixture = TestStore::new(true);
    for (id, minutes) in [("b", 20), ("d", 40), ("a", 10), ("c", 30)] {
        fixture
            .api
            .insert(notification(id, minutes, NotificationPriority::Low));
    }

    fixture
        .store
        .fetch_notifications(fixture.store.list_params())
        .await
        .unwrap();
    assert_newest_first(&fixture);

    for (id, minutes) in [("e", 50), ("early", 5), ("mid", 25), ("c", 30)] {
        fixture
            .store
            .handle_realtime_notification(notification(id, minutes, NotificationPriority::High))
            .await;
        assert_newest_first(&fixture);
    }

    let ids: Vec<_> = fixture
        .state()
        .notifications
        .iter()
        .map(|n| n.id.as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["e", "d", "c", "mid", "b", "a", "early"]);

    // A refetch replaces the cache with the server's view, still sorted.
    fixture
        .store
        .fetch_notifications(fixture.store.list_params())
        .await
        .unwrap();
    assert_newest_first(&fixture);
    assert_eq!(fixture.state().notifications.len(), 4);
}

#[tokio::test]
async fn test_mark_all_twice_leaves_everything_read() {
    let fixture = TestStore::new(true);
    for i in 0..5 {
        fixture
            .api
            .insert(notification(&format!("n{i}"), i, NotificationPriority::Medium));
    }
    fixture
        .store
        .fetch_notifications(fixture.store.list_params())
        .await
        .unwrap();
    fixture.store.fetch_unread_count().await.unwrap();
    assert_eq!(fixture.state().unread_count, 5);

    fixture.store.mark_all_as_read().await.unwrap();
    fixture.store.mark_all_as_read().await.unwrap();

    let state = fixture.state();
    assert_eq!(state.unread_count, 0);
    assert!(state.notifications.iter().all(|n| n.is_read_by_user));
    assert_eq!(fixture.api.server_unread(), 0);
}

#[tokio::test]
async fn test_disabled_sound_never_reaches_audio() {
    let fixture = TestStore::new(false);

    for i in 0..10 {
        fixture
            .store
            .handle_realtime_notification(notification(
                &format!("p{i}"),
                i,
                NotificationPriority::Urgent,
            ))
            .await;
        fixture
            .api
            .insert(notification(&format!("s{i}"), i, NotificationPriority::Low));
        fixture.store.fetch_unread_count().await.unwrap();
    }
    settle().await;

    assert_eq!(fixture.audio.attempts(), 0);
    assert_eq!(fixture.state().unread_count, 10);
    assert!(!fixture.state().sound_enabled);
}

#[tokio::test]
async fn test_urgent_push_then_matching_count_poll() {
    let fixture = TestStore::new(true);
    let n1 = notification("n1", 0, NotificationPriority::Urgent);

    fixture.store.handle_realtime_notification(n1.clone()).await;
    settle().await;

    let state = fixture.state();
    assert_eq!(state.notifications, vec![n1.clone()]);
    assert_eq!(state.unread_count, 1);
    assert_eq!(fixture.audio.attempts(), 1);
    let toasts = fixture.toasts.shown();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].variant, ToastVariant::Destructive);
    assert_eq!(toasts[0].title, n1.title);

    fixture.api.insert(n1.clone());
    fixture.store.fetch_unread_count().await.unwrap();

    let after = fixture.state();
    assert_eq!(after.notifications, vec![n1]);
    assert_eq!(after.unread_count, 1);
    assert_eq!(fixture.audio.attempts(), 1);
    assert_eq!(fixture.toasts.shown().len(), 1);
}

#[tokio::test]
async fn test_count_growth_without_push_plays_once() {
    let fixture = TestStore::new(true);
    fixture.api.insert(notification("n1", 1, NotificationPriority::Medium));
    fixture.api.insert(notification("n2", 2, NotificationPriority::Medium));

    fixture.store.fetch_unread_count().await.unwrap();
    settle().await;

    assert_eq!(fixture.state().unread_count, 2);
    assert_eq!(fixture.audio.attempts(), 1);

    fixture.store.fetch_unread_count().await.unwrap();
    settle().await;
    assert_eq!(fixture.audio.attempts(), 1);
}

#[tokio::test]
async fn test_failed_mark_as_read_keeps_optimistic_state() {
    let fixture = TestStore::new(true);
    fixture.api.insert(notification("n1", 0, NotificationPriority::High));
    fixture
        .store
        .fetch_notifications(fixture.store.list_params())
        .await
        .unwrap();
    assert_eq!(fixture.state().unread_count, 1);

    fixture.api.fail_mutations(true);
    let err = fixture
        .store
        .mark_as_read(&NotificationId::new("n1"))
        .await
        .unwrap_err();
    assert_eq!(err.status, Some(500));

    let state = fixture.state();
    assert!(state.notifications[0].is_read_by_user);
    assert_eq!(state.unread_count, 0);
    let toasts = fixture.toasts.shown();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].variant, ToastVariant::Destructive);

    // The next list poll converges to the server, which never saw the read.
    fixture
        .store
        .fetch_notifications(fixture.store.list_params())
        .await
        .unwrap();
    assert!(fixture.state().notifications[0].is_unread());
}

#[tokio::test]
async fn test_fetch_failure_retains_cache() {
    let fixture = TestStore::new(true);
    fixture.api.insert(notification("n1", 0, NotificationPriority::Low));
    fixture
        .store
        .fetch_notifications(fixture.store.list_params())
        .await
        .unwrap();

    fixture.api.fail_fetches(true);
    assert!(
        fixture
            .store
            .fetch_notifications(fixture.store.list_params())
            .await
            .is_err()
    );
    assert!(fixture.store.fetch_unread_count().await.is_err());

    let state = fixture.state();
    assert_eq!(state.status, FeedStatus::Ready);
    assert_eq!(state.notifications.len(), 1);
    assert_eq!(state.list_error.as_ref().and_then(|e| e.status), Some(503));
    assert_eq!(state.count_error.as_ref().and_then(|e| e.status), Some(503));
    // One toast per failing poll.
    assert_eq!(fixture.toasts.shown().len(), 2);

    assert!(
        fixture
            .store
            .fetch_notifications(fixture.store.list_params())
            .await
            .is_err()
    );
    assert!(fixture.store.fetch_unread_count().await.is_err());
    assert_eq!(fixture.toasts.shown().len(), 2);
}
