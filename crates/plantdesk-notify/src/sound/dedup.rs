//! Collapses bursts of alerts into a single cue.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

/// Suppresses alerts that follow the previous one within a window.
#[derive(Debug)]
pub struct AlertDeduplicator {
    window: Duration,
    last_played: Mutex<Option<Instant>>,
}

impl AlertDeduplicator {
    /// Create a deduplicator with the given window
    pub fn new(window_ms: u64) -> Self {
        Self {
            window: Duration::from_millis(window_ms),
            last_played: Mutex::new(None),
        }
    }

    /// Returns `true` and records the attempt if an alert may play now.
    pub fn should_play(&self) -> bool {
        let mut last = self.last_played.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if let Some(previous) = *last {
            if now.duration_since(previous) < self.window {
                return false;
            }
        }

        *last = Some(now);
        true
    }

    /// Forget the last alert.
    pub fn reset(&self) {
        self.last_played
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
    }
}
