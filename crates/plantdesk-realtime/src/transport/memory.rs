//! In-memory broker for tests and offline sessions.

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use plantdesk_core::error::AppError;
use plantdesk_core::result::AppResult;

use crate::state::ConnectionState;

use super::{PushTransport, TransportEvent};

/// In-memory push transport implementation.
///
/// Connecting succeeds immediately while the broker is reachable; publishing
/// delivers to the connected client if it subscribed to the channel.
#[derive(Debug)]
pub struct MemoryTransport {
    reachable: AtomicBool,
    buffer_size: usize,
    subscriptions: Mutex<BTreeSet<String>>,
    sink: Mutex<Option<mpsc::Sender<TransportEvent>>>,
    connect_attempts: Mutex<Vec<Instant>>,
    state_tx: watch::Sender<ConnectionState>,
}

impl MemoryTransport {
    /// Create a reachable in-memory broker.
    pub fn new(buffer_size: usize) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Initialized);
        Self {
            reachable: AtomicBool::new(true),
            buffer_size: buffer_size.max(1),
            subscriptions: Mutex::new(BTreeSet::new()),
            sink: Mutex::new(None),
            connect_attempts: Mutex::new(Vec::new()),
            state_tx,
        }
    }

    /// Make subsequent connection attempts succeed or fail.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Publish an event. Returns `true` if it was delivered.
    pub async fn publish(&self, channel: &str, event: &str, data: impl Into<String>) -> bool {
        let subscribed = self
            .subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(channel);
        if !subscribed {
            return false;
        }

        let sink = self.sink.lock().unwrap_or_else(|e| e.into_inner()).clone();
        match sink {
            Some(tx) => tx
                .send(TransportEvent {
                    channel: channel.to_string(),
                    event: event.to_string(),
                    data: data.into(),
                })
                .await
                .is_ok(),
            None => false,
        }
    }

    /// Simulate an unplanned connection loss.
    pub fn drop_connection(&self) {
        self.sink.lock().unwrap_or_else(|e| e.into_inner()).take();
        self.state_tx.send_replace(ConnectionState::Unavailable);
    }

    /// Channels currently subscribed.
    pub fn subscriptions(&self) -> Vec<String> {
        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    /// Instants of every connection attempt so far.
    pub fn connect_attempts(&self) -> Vec<Instant> {
        self.connect_attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl PushTransport for MemoryTransport {
    async fn connect(&self) -> AppResult<mpsc::Receiver<TransportEvent>> {
        self.connect_attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Instant::now());
        self.state_tx.send_replace(ConnectionState::Connecting);

        if !self.reachable.load(Ordering::SeqCst) {
            self.state_tx.send_replace(ConnectionState::Unavailable);
            return Err(AppError::transport("In-memory broker unreachable"));
        }

        let (tx, rx) = mpsc::channel(self.buffer_size);
        *self.sink.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
        self.state_tx.send_replace(ConnectionState::Connected);
        Ok(rx)
    }

    async fn subscribe(&self, channel: &str) -> AppResult<()> {
        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(channel.to_string());
        Ok(())
    }

    async fn unsubscribe(&self, channel: &str) -> AppResult<()> {
        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(channel);
        Ok(())
    }

    async fn disconnect(&self) {
        self.sink.lock().unwrap_or_else(|e| e.into_inner()).take();
        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.state_tx.send_replace(ConnectionState::Disconnected);
    }

    fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_requires_subscription() {
        let transport = MemoryTransport::default();
        let mut rx = transport.connect().await.unwrap();
        assert!(!transport.publish("user-1", "notification", "{}").await);

        transport.subscribe("user-1").await.unwrap();
        assert!(transport.publish("user-1", "notification", "{}").await);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.channel, "user-1");
        assert_eq!(event.event, "notification");
    }

    #[tokio::test]
    async fn test_unreachable_connect_fails() {
        let transport = MemoryTransport::default();
        transport.set_reachable(false);
        assert!(transport.connect().await.is_err());
        assert_eq!(transport.state(), ConnectionState::Unavailable);
        assert_eq!(transport.connect_attempts().len(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_clears_subscriptions() {
        let transport = MemoryTransport::default();
        let _rx = transport.connect().await.unwrap();
        transport.subscribe("notifications-all").await.unwrap();
        transport.disconnect().await;
        assert!(transport.subscriptions().is_empty());
        assert_eq!(transport.state(), ConnectionState::Disconnected);
    }
}
