//! # plantdesk-realtime
//!
//! Realtime channel manager for the PlantDesk notification client. Provides:
//!
//! - One push connection per session, multiplexing the per-user, per-role,
//!   and broadcast channels
//! - A transport abstraction with a Pusher-protocol WebSocket implementation
//!   and an in-memory broker
//! - Listener fan-out across every subscribed channel
//! - Cancellable exponential-backoff reconnection

pub mod backoff;
pub mod channel;
pub mod listener;
pub mod manager;
pub mod metrics;
pub mod state;
pub mod transport;

pub use channel::registry::ChannelRegistry;
pub use channel::types::ChannelName;
pub use listener::{Listener, ListenerId};
pub use manager::ChannelManager;
pub use state::ConnectionState;
pub use transport::memory::MemoryTransport;
pub use transport::pusher::PusherTransport;
pub use transport::{PushTransport, TransportEvent};
