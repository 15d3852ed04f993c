//! Push transport abstraction.

pub mod memory;
pub mod pusher;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use plantdesk_core::result::AppResult;

use crate::state::ConnectionState;

/// An application event received on a subscribed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    /// Channel the event arrived on.
    pub channel: String,
    /// Event name, e.g. `"notification"`.
    pub event: String,
    /// Raw JSON payload.
    pub data: String,
}

/// A pub/sub client multiplexing named channels over one connection.
///
/// `connect` may return before the handshake finishes; progress is
/// observable through [`PushTransport::state`]. Subscriptions requested while
/// connecting are sent once the connection is established.
#[async_trait]
pub trait PushTransport: Send + Sync + std::fmt::Debug + 'static {
    /// Opens the connection. Events for subscribed channels arrive on the returned receiver.
    async fn connect(&self) -> AppResult<mpsc::Receiver<TransportEvent>>;

    /// Subscribes to a channel.
    async fn subscribe(&self, channel: &str) -> AppResult<()>;

    /// Unsubscribes from a channel.
    async fn unsubscribe(&self, channel: &str) -> AppResult<()>;

    /// Closes the connection and forgets all subscriptions.
    async fn disconnect(&self);

    /// Current connection state.
    fn state(&self) -> ConnectionState;

    /// Receiver notified on every state change.
    fn state_changes(&self) -> watch::Receiver<ConnectionState>;
}
