//! Notification state store.
//!
//! Reconciles three writers into one observable [`FeedState`]: the list
//! poll, the unread-count poll, and realtime pushes. Mutations are applied
//! optimistically and never rolled back; the next poll converges the cache
//! toward the server.

pub mod cache;
pub mod state;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use plantdesk_core::error::AppError;
use plantdesk_core::result::AppResult;
use plantdesk_core::types::{ListParams, Notification, NotificationId};

use crate::api::NotificationApi;
use crate::sound::SoundAlertEngine;
use crate::toast::{Toast, ToastSink};

use self::cache::{Merge, ReadChange};

pub use self::state::{FeedState, FeedStatus};

/// Which poll a fetch failure came from.
#[derive(Debug, Clone, Copy)]
enum Poll {
    List,
    Count,
}

/// Client-side cache of the viewing user's notifications.
#[derive(Debug)]
pub struct NotificationStore {
    api: Arc<dyn NotificationApi>,
    sound: Arc<SoundAlertEngine>,
    toasts: Arc<dyn ToastSink>,
    state: watch::Sender<FeedState>,
    invalidations: watch::Sender<u64>,
    /// Bumped when a session ends; responses from older epochs are dropped.
    epoch: AtomicU64,
    list_params: Mutex<ListParams>,
}

impl NotificationStore {
    /// Create an empty store.
    pub fn new(
        api: Arc<dyn NotificationApi>,
        sound: Arc<SoundAlertEngine>,
        toasts: Arc<dyn ToastSink>,
    ) -> Self {
        let (state, _) = watch::channel(FeedState::new(sound.preference().is_enabled()));
        let (invalidations, _) = watch::channel(0);
        Self {
            api,
            sound,
            toasts,
            state,
            invalidations,
            epoch: AtomicU64::new(0),
            list_params: Mutex::new(ListParams::default()),
        }
    }

    /// Current view.
    pub fn snapshot(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// Receiver that changes whenever server data should be refetched.
    pub fn invalidations(&self) -> watch::Receiver<u64> {
        self.invalidations.subscribe()
    }

    /// Parameters of the most recent list fetch; the list poll reuses them.
    pub fn list_params(&self) -> ListParams {
        self.list_params
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Set the parameters the list poll uses until the next explicit fetch.
    pub fn set_list_params(&self, params: ListParams) {
        *self.list_params.lock().unwrap_or_else(|e| e.into_inner()) = params;
    }

    /// Current session epoch.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch() == epoch
    }

    fn invalidate(&self) {
        self.invalidations.send_modify(|generation| *generation += 1);
    }

    /// Fetch one page and replace the cached list.
    ///
    /// On failure the cached list is kept, a toast is shown, and the error
    /// is returned for information.
    pub async fn fetch_notifications(&self, params: ListParams) -> AppResult<()> {
        let epoch = self.epoch();
        self.set_list_params(params.clone());

        self.state.send_if_modified(|s| {
            if s.status == FeedStatus::Idle {
                s.status = FeedStatus::Loading;
                true
            } else {
                false
            }
        });

        let result = self.api.list(&params).await;
        if !self.is_current(epoch) {
            debug!(epoch, "Discarding list response from an ended session");
            return Ok(());
        }

        match result {
            Ok(page) => {
                let mut notifications = page.notifications;
                cache::sort_newest_first(&mut notifications);
                let fetched = notifications.len();

                self.state.send_modify(|s| {
                    s.notifications = notifications;
                    s.pagination = page.pagination;
                    s.status = FeedStatus::Ready;
                    s.list_error = None;
                    if !s.count_from_server {
                        s.unread_count = s.cached_unread();
                    }
                });
                debug!(page = params.page, fetched, "Notifications refreshed");
                Ok(())
            }
            Err(e) => {
                self.record_fetch_failure("Failed to load notifications", &e, Poll::List);
                Err(e)
            }
        }
    }

    /// Fetch the server unread count, starting an alert if it grew.
    ///
    /// Also refreshes the mirrored sound preference, which another process
    /// may have changed.
    pub async fn fetch_unread_count(&self) -> AppResult<()> {
        let epoch = self.epoch();
        let result = self.api.unread_count().await;
        if !self.is_current(epoch) {
            debug!(epoch, "Discarding unread count from an ended session");
            return Ok(());
        }

        match result {
            Ok(count) => {
                let sound_enabled = self.sound.preference().is_enabled();
                let mut previous = 0;
                self.state.send_modify(|s| {
                    previous = s.unread_count;
                    s.unread_count = count;
                    s.count_from_server = true;
                    s.count_error = None;
                    s.sound_enabled = sound_enabled;
                });

                if count > previous {
                    let alert = self.sound.play_alert();
                    info!(previous, count, alert = alert.is_some(), "Unread count increased");
                }
                Ok(())
            }
            Err(e) => {
                self.record_fetch_failure("Failed to load unread count", &e, Poll::Count);
                Err(e)
            }
        }
    }

    /// Optimistically mark one notification read, then tell the server.
    ///
    /// A failed request leaves the optimistic state in place and shows a toast.
    pub async fn mark_as_read(&self, id: &NotificationId) -> AppResult<()> {
        let epoch = self.epoch();
        let mut change = ReadChange::NotCached;
        self.state.send_modify(|s| {
            change = cache::mark_read(&mut s.notifications, id);
            if change != ReadChange::AlreadyRead {
                s.unread_count = s.unread_count.saturating_sub(1);
            }
        });
        debug!(notification_id = %id, ?change, "Marked notification read locally");

        let result = self.api.mark_read(id).await;
        if !self.is_current(epoch) {
            return result;
        }
        match result {
            Ok(()) => {
                self.invalidate();
                Ok(())
            }
            Err(e) => {
                warn!(notification_id = %id, error = %e, "Mark-as-read request failed");
                self.toasts
                    .show(Toast::for_error("Failed to mark notification as read", &e));
                Err(e)
            }
        }
    }

    /// Optimistically mark everything read, then tell the server.
    pub async fn mark_all_as_read(&self) -> AppResult<()> {
        let epoch = self.epoch();
        self.state.send_modify(|s| {
            cache::mark_all_read(&mut s.notifications);
            s.unread_count = 0;
        });

        let result = self.api.mark_all_read().await;
        if !self.is_current(epoch) {
            return result;
        }
        match result {
            Ok(()) => {
                info!("All notifications marked read");
                self.invalidate();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Mark-all-read request failed");
                self.toasts
                    .show(Toast::for_error("Failed to mark all notifications as read", &e));
                Err(e)
            }
        }
    }

    /// Apply a pushed notification: sound, cache insert, count, toast, invalidate.
    ///
    /// The alert is only started here; it finishes in the background.
    pub async fn handle_realtime_notification(&self, notification: Notification) {
        let alert = self.sound.play_alert();

        let toast = Toast::for_notification(&notification);
        let id = notification.id.clone();
        let unread = notification.is_unread();
        let mut merged = Merge::Inserted;
        self.state.send_modify(|s| {
            merged = cache::merge(&mut s.notifications, notification);
            if merged == Merge::Inserted && unread {
                s.unread_count += 1;
            }
        });

        self.toasts.show(toast);
        self.invalidate();
        info!(notification_id = %id, ?merged, alert = alert.is_some(), "Realtime notification applied");
    }

    /// Flip the sound preference. No network.
    pub fn toggle_sound(&self) -> bool {
        let enabled = self.sound.preference().toggle();
        self.state.send_modify(|s| s.sound_enabled = enabled);
        enabled
    }

    /// Drop cached data and ignore any response still in flight.
    pub fn end_session(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.sound.reset_dedup();
        let sound_enabled = self.sound.preference().is_enabled();
        self.state.send_replace(FeedState::new(sound_enabled));
        debug!(epoch, "Notification store reset");
    }

    fn record_fetch_failure(&self, title: &str, error: &AppError, poll: Poll) {
        let mut already_failing = false;
        self.state.send_modify(|s| {
            let slot = match poll {
                Poll::List => {
                    if matches!(s.status, FeedStatus::Idle | FeedStatus::Loading) {
                        s.status = FeedStatus::Error;
                    }
                    &mut s.list_error
                }
                Poll::Count => &mut s.count_error,
            };
            already_failing = slot.is_some();
            *slot = Some(error.clone());
        });

        warn!(error = %error, status = ?error.status, ?poll, "{title}");
        // Consecutive failures of the same poll share one toast.
        if !already_failing {
            self.toasts.show(Toast::for_error(title, error));
        }
    }
}
