//! Realtime channel manager.
//!
//! Owns the session's single push connection, the set of subscribed channels,
//! and the listeners bound to them. Transport failures are logged here and
//! surface to callers only through [`ChannelManager::connection_state`].

use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use plantdesk_core::config::RealtimeConfig;
use plantdesk_core::types::{Notification, SessionUser};

use crate::backoff::{ReconnectOutcome, backoff_delay};
use crate::channel::registry::ChannelRegistry;
use crate::channel::types::session_channels;
use crate::listener::{Listener, ListenerId};
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};
use crate::state::ConnectionState;
use crate::transport::{PushTransport, TransportEvent};

/// Manages one push connection and fans notifications out to listeners.
pub struct ChannelManager {
    transport: Arc<dyn PushTransport>,
    config: RealtimeConfig,
    registry: Arc<ChannelRegistry>,
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    dispatch_task: Mutex<Option<JoinHandle<()>>>,
    reconnect_token: Mutex<Option<CancellationToken>>,
    current_user: RwLock<Option<SessionUser>>,
    /// Serializes connect and teardown.
    lifecycle: tokio::sync::Mutex<()>,
    metrics: Arc<RealtimeMetrics>,
}

impl ChannelManager {
    /// Create a manager over the given transport.
    pub fn new(transport: Arc<dyn PushTransport>, config: RealtimeConfig) -> Self {
        Self {
            transport,
            config,
            registry: Arc::new(ChannelRegistry::new()),
            listeners: RwLock::new(Vec::new()),
            dispatch_task: Mutex::new(None),
            reconnect_token: Mutex::new(None),
            current_user: RwLock::new(None),
            lifecycle: tokio::sync::Mutex::new(()),
            metrics: Arc::new(RealtimeMetrics::new()),
        }
    }

    /// Connect for `user` and subscribe to the user, role and broadcast channels.
    ///
    /// Any existing connection is torn down first and any pending backoff
    /// chain is cancelled. Failures are logged and leave the manager in a
    /// lost state; they are never returned.
    pub async fn initialize(&self, user: &SessionUser) {
        self.cancel_reconnect();
        self.connect_session(user).await;
    }

    /// Bind a notification listener on every current and future channel.
    pub fn register_listener(&self, listener: Listener) -> ListenerId {
        let id = ListenerId::new();
        self.registry.bind_all(id, &listener);
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, listener));
        debug!(listener_id = %id, "Registered notification listener");
        id
    }

    /// Remove a listener from every channel.
    pub fn unregister_listener(&self, id: ListenerId) {
        self.registry.unbind_all(id);
        self.listeners
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(existing, _)| *existing != id);
    }

    /// Current state of the underlying connection.
    pub fn connection_state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// Receiver notified on every connection state change.
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.transport.state_changes()
    }

    /// Names of the subscribed channels, sorted.
    pub fn channels(&self) -> Vec<String> {
        self.registry.names()
    }

    /// The user the current connection was opened for.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.current_user
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Unsubscribe everything, disconnect, and cancel any pending backoff chain.
    pub async fn teardown(&self) {
        self.cancel_reconnect();
        let _guard = self.lifecycle.lock().await;
        self.release().await;
        info!("Realtime channels torn down");
    }

    /// Start a cancellable reconnection chain for `user`.
    ///
    /// Attempt `n` waits [`backoff_delay`], reconnects, then waits the
    /// confirmation window before checking for a live connection. The chain
    /// stops on success, after `max_attempts` failures, or on
    /// [`ChannelManager::teardown`]. Starting a new chain cancels the previous one.
    pub fn reconnect_with_backoff(
        self: &Arc<Self>,
        user: SessionUser,
        max_attempts: u32,
    ) -> JoinHandle<ReconnectOutcome> {
        let token = CancellationToken::new();
        let previous = self
            .reconnect_token
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }

        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    debug!(user_id = %user.id, "Reconnection chain cancelled");
                    ReconnectOutcome::Cancelled
                }
                outcome = manager.run_backoff(&user, max_attempts) => outcome,
            };

            // A cancelled token has already been taken or replaced.
            if !token.is_cancelled() {
                manager
                    .reconnect_token
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .take();
            }
            outcome
        })
    }

    /// Whether a reconnection chain is currently pending.
    pub fn is_reconnecting(&self) -> bool {
        self.reconnect_token
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    async fn run_backoff(&self, user: &SessionUser, max_attempts: u32) -> ReconnectOutcome {
        let base = self.config.reconnect_base_delay();
        let max = self.config.reconnect_max_delay();

        for attempt in 1..=max_attempts {
            let delay = backoff_delay(attempt, base, max);
            info!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                "Scheduling realtime reconnection"
            );
            tokio::time::sleep(delay).await;

            self.connect_session(user).await;
            tokio::time::sleep(self.config.confirm_window()).await;

            if self.transport.state().is_connected() {
                info!(attempt, "Realtime connection restored");
                return ReconnectOutcome::Connected { attempts: attempt };
            }
            warn!(attempt, state = %self.transport.state(), "Reconnection attempt did not connect");
        }

        error!(
            max_attempts,
            "Giving up on realtime reconnection, continuing in poll-only mode"
        );
        ReconnectOutcome::GaveUp {
            attempts: max_attempts,
        }
    }

    fn cancel_reconnect(&self) {
        let token = self
            .reconnect_token
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(token) = token {
            token.cancel();
        }
    }

    async fn connect_session(&self, user: &SessionUser) {
        let _guard = self.lifecycle.lock().await;
        self.release().await;

        self.metrics.connect_attempted();
        let events = match self.transport.connect().await {
            Ok(events) => events,
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Realtime connection failed");
                return;
            }
        };
        self.spawn_dispatch(events);

        let listeners: Vec<(ListenerId, Listener)> = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        for channel in session_channels(user) {
            let name = channel.to_channel_string();
            if let Err(e) = self.transport.subscribe(&name).await {
                warn!(channel = %name, error = %e, "Channel subscription failed");
                continue;
            }
            self.registry.insert(&name);
            if let Some(handle) = self.registry.get(&name) {
                for (id, listener) in &listeners {
                    handle.bind(*id, listener.clone());
                }
            }
        }

        *self.current_user.write().unwrap_or_else(|e| e.into_inner()) = Some(user.clone());
        info!(
            user_id = %user.id,
            role = %user.role,
            channels = ?self.registry.names(),
            "Realtime channels initialized"
        );
    }

    /// Drops channels, stops dispatch, and closes the connection. Caller holds `lifecycle`.
    async fn release(&self) {
        for name in self.registry.drain() {
            if let Err(e) = self.transport.unsubscribe(&name).await {
                debug!(channel = %name, error = %e, "Unsubscribe failed during teardown");
            }
        }

        let task = self
            .dispatch_task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(task) = task {
            task.abort();
        }

        self.transport.disconnect().await;
        self.current_user
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }

    fn spawn_dispatch(&self, mut events: mpsc::Receiver<TransportEvent>) {
        let registry = self.registry.clone();
        let metrics = self.metrics.clone();
        let event_name = self.config.event_name.clone();

        let task = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                metrics.event_received();
                if event.event != event_name {
                    trace!(channel = %event.channel, event = %event.event, "Ignoring push event");
                    continue;
                }

                let notification: Notification = match serde_json::from_str(&event.data) {
                    Ok(n) => n,
                    Err(e) => {
                        metrics.decode_failed();
                        warn!(channel = %event.channel, error = %e, "Undecodable notification payload");
                        continue;
                    }
                };

                match registry.get(&event.channel) {
                    Some(handle) => {
                        let delivered = handle.dispatch(&notification);
                        metrics.dispatched(delivered as u64);
                        debug!(
                            channel = %event.channel,
                            notification_id = %notification.id,
                            listeners = delivered,
                            "Dispatched notification"
                        );
                    }
                    None => {
                        trace!(channel = %event.channel, "Event for unknown channel dropped");
                    }
                }
            }
            debug!("Push event stream closed");
        });

        *self.dispatch_task.lock().unwrap_or_else(|e| e.into_inner()) = Some(task);
    }
}

impl fmt::Debug for ChannelManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len();
        f.debug_struct("ChannelManager")
            .field("transport", &self.transport)
            .field("channels", &self.registry.names())
            .field("listeners", &listeners)
            .field("state", &self.transport.state())
            .finish()
    }
}

impl Drop for ChannelManager {
    fn drop(&mut self) {
        self.cancel_reconnect();
        if let Some(task) = self
            .dispatch_task
            .get_mut()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            task.abort();
        }
    }
}
