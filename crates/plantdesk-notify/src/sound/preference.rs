//! Persisted sound on/off preference.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use plantdesk_core::local::SessionStorage;

/// Sound preference, written through to local storage.
///
/// Reads go to storage each time so a change made by another process (for
/// example `plantdesk sound off` while the notifier runs) applies to the
/// next alert. The in-memory copy is only used when storage cannot be read.
#[derive(Debug)]
pub struct SoundPreference {
    enabled: AtomicBool,
    storage: SessionStorage,
}

impl SoundPreference {
    /// Load the stored preference, falling back to `default`.
    pub fn load(storage: SessionStorage, default: bool) -> Self {
        let enabled = storage.sound_enabled(default);
        Self {
            enabled: AtomicBool::new(enabled),
            storage,
        }
    }

    /// Whether alerts may play.
    pub fn is_enabled(&self) -> bool {
        let last_known = self.enabled.load(Ordering::SeqCst);
        let enabled = self.storage.sound_enabled(last_known);
        if enabled != last_known {
            debug!(enabled, "Sound preference changed in storage");
            self.enabled.store(enabled, Ordering::SeqCst);
        }
        enabled
    }

    /// Set and persist the preference. A failed write keeps the in-memory value.
    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        if let Err(e) = self.storage.set_sound_enabled(enabled) {
            warn!(error = %e, "Failed to persist sound preference");
        }
        info!(enabled, "Sound preference changed");
    }

    /// Flip the preference and return the new value.
    pub fn toggle(&self) -> bool {
        let enabled = !self.is_enabled();
        self.set(enabled);
        enabled
    }
}
