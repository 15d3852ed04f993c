//! Transport connection states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection state of the push transport, in the broker's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// No connection attempted yet.
    #[default]
    Initialized,
    /// Handshake in progress.
    Connecting,
    /// Connected and able to receive events.
    Connected,
    /// Network unavailable or connection lost; retry is meaningful.
    Unavailable,
    /// The broker rejected the client; retrying will not help without new settings.
    Failed,
    /// Closed on purpose.
    Disconnected,
}

impl ConnectionState {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Unavailable => "unavailable",
            Self::Failed => "failed",
            Self::Disconnected => "disconnected",
        }
    }

    /// Whether events can currently be delivered.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Whether this state represents an unplanned loss of connectivity.
    pub fn is_lost(&self) -> bool {
        matches!(self, Self::Unavailable | Self::Failed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
