//! Per-user notification session.
//!
//! Wires the store to its three inputs for one signed-in user: the list
//! and count poll loops, the realtime push bridge, and a watcher that
//! starts backoff reconnection when the push connection is lost.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use plantdesk_core::config::AppConfig;
use plantdesk_core::types::{ListParams, Notification, SessionUser};
use plantdesk_realtime::{ChannelManager, Listener, ListenerId};

use crate::store::NotificationStore;

/// Session tuning, usually derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Parameters for the first list fetch.
    pub list_params: ListParams,
    /// List refresh period.
    pub list_interval: Duration,
    /// Unread count refresh period.
    pub count_interval: Duration,
    /// Connect to the push broker; otherwise poll only.
    pub realtime: bool,
    /// Attempts per reconnection chain.
    pub max_reconnect_attempts: u32,
}

impl SessionOptions {
    /// Options from the application configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            list_params: ListParams::new(1, config.api.page_size),
            list_interval: config.polling.list_interval(),
            count_interval: config.polling.count_interval(),
            realtime: config.realtime.enabled,
            max_reconnect_attempts: config.realtime.max_reconnect_attempts,
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[derive(Debug, Clone, Copy)]
enum Poll {
    List,
    Count,
}

/// A running notification session.
#[derive(Debug)]
pub struct NotificationSession {
    user: SessionUser,
    store: Arc<NotificationStore>,
    manager: Arc<ChannelManager>,
    listener_id: Option<ListenerId>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl NotificationSession {
    /// Start polling and, when enabled, realtime delivery for `user`.
    pub async fn start(
        user: SessionUser,
        store: Arc<NotificationStore>,
        manager: Arc<ChannelManager>,
        options: SessionOptions,
    ) -> Self {
        let cancel = CancellationToken::new();
        let mut tasks = Vec::new();
        store.set_list_params(options.list_params.clone());

        let listener_id = if options.realtime {
            let (tx, rx) = mpsc::unbounded_channel::<Notification>();
            let listener: Listener = Arc::new(move |notification| {
                let _ = tx.send(notification);
            });
            let id = manager.register_listener(listener);
            tasks.push(tokio::spawn(bridge_pushes(
                store.clone(),
                rx,
                cancel.clone(),
            )));

            manager.initialize(&user).await;
            tasks.push(tokio::spawn(watch_connection(
                manager.clone(),
                user.clone(),
                options.max_reconnect_attempts,
                cancel.clone(),
            )));
            Some(id)
        } else {
            info!("Realtime disabled, running in poll-only mode");
            None
        };

        tasks.push(tokio::spawn(poll_loop(
            store.clone(),
            Poll::List,
            options.list_interval,
            cancel.clone(),
        )));
        tasks.push(tokio::spawn(poll_loop(
            store.clone(),
            Poll::Count,
            options.count_interval,
            cancel.clone(),
        )));

        info!(
            user_id = %user.id,
            role = %user.role,
            realtime = options.realtime,
            "Notification session started"
        );

        Self {
            user,
            store,
            manager,
            listener_id,
            cancel,
            tasks,
        }
    }

    /// The signed-in user.
    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    /// The session's store.
    pub fn store(&self) -> &Arc<NotificationStore> {
        &self.store
    }

    /// The session's channel manager.
    pub fn manager(&self) -> &Arc<ChannelManager> {
        &self.manager
    }

    /// Stop every task, tear down realtime, and reset the store.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Some(id) = self.listener_id {
            self.manager.unregister_listener(id);
        }
        self.manager.teardown().await;
        self.store.end_session();

        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Session task ended abnormally");
            }
        }
        info!(user_id = %self.user.id, "Notification session stopped");
    }
}

async fn poll_loop(
    store: Arc<NotificationStore>,
    poll: Poll,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut invalidations = store.invalidations();

    debug!(?poll, period_secs = period.as_secs(), "Poll loop started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
            changed = invalidations.changed() => {
                if changed.is_err() {
                    break;
                }
                ticker.reset();
            }
        }

        let refresh = async {
            match poll {
                Poll::List => store.fetch_notifications(store.list_params()).await,
                Poll::Count => store.fetch_unread_count().await,
            }
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = refresh => {
                if let Err(e) = result {
                    debug!(?poll, error = %e, "Poll refresh failed");
                }
            }
        }
    }

    debug!(?poll, "Poll loop stopped");
}

async fn bridge_pushes(
    store: Arc<NotificationStore>,
    mut pushes: mpsc::UnboundedReceiver<Notification>,
    cancel: CancellationToken,
) {
    loop {
        let notification = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = pushes.recv() => match next {
                Some(notification) => notification,
                None => break,
            },
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = store.handle_realtime_notification(notification) => {}
        }
    }
}

async fn watch_connection(
    manager: Arc<ChannelManager>,
    user: SessionUser,
    max_attempts: u32,
    cancel: CancellationToken,
) {
    let mut states = manager.state_changes();

    loop {
        let state = *states.borrow_and_update();
        if state.is_lost() && !manager.is_reconnecting() {
            warn!(state = %state, "Realtime connection lost, scheduling reconnection");
            drop(manager.reconnect_with_backoff(user.clone(), max_attempts));
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
}
