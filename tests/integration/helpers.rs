//! Shared test helpers for integration tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use plantdesk_core::config::{RealtimeConfig, SoundConfig};
use plantdesk_core::error::AppError;
use plantdesk_core::local::{MemoryStore, SessionStorage};
use plantdesk_core::result::AppResult;
use plantdesk_core::types::{
    ListParams, Notification, NotificationId, NotificationPriority, NotificationType, Pagination,
    SessionUser,
};
use plantdesk_notify::session::SessionOptions;
use plantdesk_notify::sound::output::AudioOutput;
use plantdesk_notify::sound::preference::SoundPreference;
use plantdesk_notify::sound::synth::Tone;
use plantdesk_notify::{
    FeedState, NotificationApi, NotificationPage, NotificationSession, NotificationStore,
    SoundAlertEngine, Toast, ToastSink,
};
use plantdesk_realtime::{ChannelManager, MemoryTransport};

/// Backend stand-in holding the server-side notification list.
#[derive(Debug, Default)]
pub struct MockApi {
    server: Mutex<Vec<Notification>>,
    fail_fetches: AtomicBool,
    fail_mutations: AtomicBool,
    list_calls: AtomicUsize,
    count_calls: AtomicUsize,
}

impl MockApi {
    /// Add a notification on the server side.
    pub fn insert(&self, notification: Notification) {
        self.server.lock().unwrap().push(notification);
    }

    /// Make list and count requests fail with HTTP 503.
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Make read mutations fail with HTTP 500.
    pub fn fail_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::SeqCst)
    }

    /// Server-side unread total.
    pub fn server_unread(&self) -> u64 {
        self.server
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.is_unread())
            .count() as u64
    }
}

#[async_trait]
impl NotificationApi for MockApi {
    async fn list(&self, params: &ListParams) -> AppResult<NotificationPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(AppError::fetch("HTTP 503").with_status(503));
        }

        let mut matching: Vec<Notification> = self
            .server
            .lock()
            .unwrap()
            .iter()
            .filter(|n| !params.unread_only || n.is_unread())
            .cloned()
            .collect();
        // Server order is insertion order; the store is expected to sort.
        let total = matching.len() as u64;
        let skip = ((params.page - 1) * params.limit) as usize;
        matching = matching
            .into_iter()
            .skip(skip)
            .take(params.limit as usize)
            .collect();

        Ok(NotificationPage {
            notifications: matching,
            pagination: Some(Pagination::new(params.page, params.limit, total)),
        })
    }

    async fn unread_count(&self) -> AppResult<u64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(AppError::fetch("HTTP 503").with_status(503));
        }
        Ok(self.server_unread())
    }

    async fn mark_read(&self, id: &NotificationId) -> AppResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(AppError::mutation("HTTP 500").with_status(500));
        }
        for n in self.server.lock().unwrap().iter_mut() {
            if &n.id == id {
                n.is_read_by_user = true;
            }
        }
        Ok(())
    }

    async fn mark_all_read(&self) -> AppResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(AppError::mutation("HTTP 500").with_status(500));
        }
        for n in self.server.lock().unwrap().iter_mut() {
            n.is_read_by_user = true;
        }
        Ok(())
    }
}

/// Audio output that counts every attempt and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    attempts: AtomicUsize,
}

impl RecordingAudio {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioOutput for RecordingAudio {
    async fn play_tones(&self, _tones: &[Tone], _volume: f32) -> AppResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn play_clip(&self, _path: &std::path::Path, _volume: f32) -> AppResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Toast sink that keeps everything shown.
#[derive(Debug, Default)]
pub struct RecordingToasts(Mutex<Vec<Toast>>);

impl RecordingToasts {
    pub fn shown(&self) -> Vec<Toast> {
        self.0.lock().unwrap().clone()
    }
}

impl ToastSink for RecordingToasts {
    fn show(&self, toast: Toast) {
        self.0.lock().unwrap().push(toast);
    }
}

/// Fixed reference time for building notifications.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 7, 30, 0).unwrap()
}

/// Unread notification created `minutes` after [`base_time`].
pub fn notification(id: &str, minutes: i64, priority: NotificationPriority) -> Notification {
    Notification {
        id: NotificationId::new(id),
        kind: NotificationType::Order,
        priority,
        title: format!("Order {id} updated"),
        message: format!("Production order {id} moved to the next stage"),
        data: None,
        is_read_by_user: false,
        created_at: base_time() + chrono::Duration::minutes(minutes),
    }
}

pub fn sales_user() -> SessionUser {
    SessionUser::new("u-42", "Sales")
}

/// Let spawned tasks run without reaching the next poll tick.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

/// Store plus its recording collaborators, without any background tasks.
pub struct TestStore {
    pub api: Arc<MockApi>,
    pub audio: Arc<RecordingAudio>,
    pub toasts: Arc<RecordingToasts>,
    pub preference: Arc<SoundPreference>,
    pub store: Arc<NotificationStore>,
}

impl TestStore {
    pub fn new(sound_enabled: bool) -> Self {
        let api = Arc::new(MockApi::default());
        let audio = Arc::new(RecordingAudio::default());
        let toasts = Arc::new(RecordingToasts::default());
        let storage = SessionStorage::new(Arc::new(MemoryStore::new()));
        let preference = Arc::new(SoundPreference::load(storage, sound_enabled));
        let config = SoundConfig {
            dedup_window_ms: 0,
            ..SoundConfig::default()
        };
        let sound = Arc::new(SoundAlertEngine::new(
            audio.clone(),
            preference.clone(),
            &config,
        ));
        let store = Arc::new(NotificationStore::new(api.clone(), sound, toasts.clone()));
        Self {
            api,
            audio,
            toasts,
            preference,
            store,
        }
    }

    pub fn state(&self) -> FeedState {
        self.store.snapshot()
    }
}

/// A running session over an in-memory broker.
pub struct TestSession {
    pub fixture: TestStore,
    pub transport: Arc<MemoryTransport>,
    pub manager: Arc<ChannelManager>,
    pub session: NotificationSession,
}

impl TestSession {
    /// Session options used by every scenario: 30 s list, 15 s count, 3 reconnect attempts.
    pub fn options() -> SessionOptions {
        SessionOptions {
            list_params: ListParams::new(1, 20),
            list_interval: Duration::from_secs(30),
            count_interval: Duration::from_secs(15),
            realtime: true,
            max_reconnect_attempts: 3,
        }
    }

    pub async fn start(fixture: TestStore, transport: Arc<MemoryTransport>) -> Self {
        Self::start_with(fixture, transport, Self::options()).await
    }

    pub async fn start_with(
        fixture: TestStore,
        transport: Arc<MemoryTransport>,
        options: SessionOptions,
    ) -> Self {
        let manager = Arc::new(ChannelManager::new(
            transport.clone(),
            RealtimeConfig::default(),
        ));
        let session = NotificationSession::start(
            sales_user(),
            fixture.store.clone(),
            manager.clone(),
            options,
        )
        .await;
        settle().await;
        Self {
            fixture,
            transport,
            manager,
            session,
        }
    }

    /// Publish a notification event on `channel` as the backend would.
    pub async fn push(&self, channel: &str, notification: &Notification) -> bool {
        let payload = serde_json::to_string(notification).unwrap();
        let delivered = self
            .transport
            .publish(channel, "notification", payload)
            .await;
        settle().await;
        delivered
    }

    pub fn state(&self) -> FeedState {
        self.fixture.state()
    }
}
