//! Realtime transport counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters kept by the channel manager.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    /// Connection attempts (initial and reconnect).
    pub connect_attempts: AtomicU64,
    /// Raw events received from the transport.
    pub events_received: AtomicU64,
    /// Notification deliveries to listeners.
    pub notifications_dispatched: AtomicU64,
    /// Events whose payload could not be decoded.
    pub decode_failures: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connection attempt.
    pub fn connect_attempted(&self) {
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a received event.
    pub fn event_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record deliveries to `count` listeners.
    pub fn dispatched(&self, count: u64) {
        self.notifications_dispatched
            .fetch_add(count, Ordering::Relaxed);
    }

    /// Record an undecodable payload.
    pub fn decode_failed(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connect_attempts: self.connect_attempts.load(Ordering::Relaxed),
            events_received: self.events_received.load(Ordering::Relaxed),
            notifications_dispatched: self.notifications_dispatched.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable snapshot of [`RealtimeMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connection attempts.
    pub connect_attempts: u64,
    /// Raw events received.
    pub events_received: u64,
    /// Listener deliveries.
    pub notifications_dispatched: u64,
    /// Undecodable payloads.
    pub decode_failures: u64,
}
