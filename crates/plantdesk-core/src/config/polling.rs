//! Backstop polling configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Fixed-interval refresh timers that correct state when pushes are missed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Notification list refresh interval in seconds.
    #[serde(default = "default_list_interval")]
    pub list_interval_seconds: u64,
    /// Unread count refresh interval in seconds.
    #[serde(default = "default_count_interval")]
    pub count_interval_seconds: u64,
}

impl PollingConfig {
    /// List refresh interval.
    pub fn list_interval(&self) -> Duration {
        Duration::from_secs(self.list_interval_seconds)
    }

    /// Unread count refresh interval.
    pub fn count_interval(&self) -> Duration {
        Duration::from_secs(self.count_interval_seconds)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            list_interval_seconds: default_list_interval(),
            count_interval_seconds: default_count_interval(),
        }
    }
}

fn default_list_interval() -> u64 {
    30
}

fn default_count_interval() -> u64 {
    15
}
