//! Realtime push transport configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Realtime (Pusher-protocol) transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Whether the realtime transport is used at all (poll-only when false).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Application key issued by the message broker.
    #[serde(default = "default_app_key")]
    pub app_key: String,
    /// Regional cluster, e.g. `"ap2"`.
    #[serde(default = "default_cluster")]
    pub cluster: String,
    /// Host override for self-hosted brokers. Derived from the cluster when unset.
    #[serde(default)]
    pub host: Option<String>,
    /// Port override. Defaults to 443 with TLS and 80 without.
    #[serde(default)]
    pub port: Option<u16>,
    /// Whether to connect over `wss://`.
    #[serde(default = "default_true")]
    pub use_tls: bool,
    /// Event name carrying notification payloads.
    #[serde(default = "default_event_name")]
    pub event_name: String,
    /// Seconds of inactivity before the client pings the broker.
    #[serde(default = "default_activity_timeout")]
    pub activity_timeout_seconds: u64,
    /// Seconds to wait for a pong before treating the connection as lost.
    #[serde(default = "default_pong_timeout")]
    pub pong_timeout_seconds: u64,
    /// How long a reconnect attempt waits before checking it succeeded.
    #[serde(default = "default_confirm_window")]
    pub confirm_window_ms: u64,
    /// Base delay of the exponential reconnect backoff.
    #[serde(default = "default_base_delay")]
    pub reconnect_base_delay_ms: u64,
    /// Upper bound for a single reconnect delay.
    #[serde(default = "default_max_delay")]
    pub reconnect_max_delay_ms: u64,
    /// Attempts before the reconnect chain gives up.
    #[serde(default = "default_max_attempts")]
    pub max_reconnect_attempts: u32,
    /// Buffer size of the inbound event channel.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl RealtimeConfig {
    /// Confirmation window as a [`Duration`].
    pub fn confirm_window(&self) -> Duration {
        Duration::from_millis(self.confirm_window_ms)
    }

    /// Backoff base delay as a [`Duration`].
    pub fn reconnect_base_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_base_delay_ms)
    }

    /// Backoff delay cap as a [`Duration`].
    pub fn reconnect_max_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_delay_ms)
    }

    /// Resolved broker host.
    pub fn resolved_host(&self) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| format!("ws-{}.pusher.com", self.cluster))
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_key: default_app_key(),
            cluster: default_cluster(),
            host: None,
            port: None,
            use_tls: true,
            event_name: default_event_name(),
            activity_timeout_seconds: default_activity_timeout(),
            pong_timeout_seconds: default_pong_timeout(),
            confirm_window_ms: default_confirm_window(),
            reconnect_base_delay_ms: default_base_delay(),
            reconnect_max_delay_ms: default_max_delay(),
            max_reconnect_attempts: default_max_attempts(),
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_app_key() -> String {
    String::new()
}

fn default_cluster() -> String {
    "ap2".to_string()
}

fn default_event_name() -> String {
    "notification".to_string()
}

fn default_activity_timeout() -> u64 {
    120
}

fn default_pong_timeout() -> u64 {
    30
}

fn default_confirm_window() -> u64 {
    2000
}

fn default_base_delay() -> u64 {
    1000
}

fn default_max_delay() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_channel_buffer() -> usize {
    256
}
