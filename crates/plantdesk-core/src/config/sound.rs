//! Sound alert configuration.

use serde::{Deserialize, Serialize};

/// Sound alert engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Preference value used when nothing is persisted yet.
    #[serde(default = "default_true")]
    pub enabled_by_default: bool,
    /// Volume for ambient alerts triggered by incoming notifications.
    #[serde(default = "default_ambient_volume")]
    pub ambient_volume: f32,
    /// Volume for explicit user-triggered sound tests.
    #[serde(default = "default_test_volume")]
    pub test_volume: f32,
    /// Pre-encoded WAV clip used when the oscillator cue fails.
    #[serde(default)]
    pub clip_path: Option<String>,
    /// External player fed WAV data on stdin, e.g. `"aplay -q"` or `"paplay"`.
    #[serde(default)]
    pub player_command: Option<String>,
    /// Alerts within this window of the previous one are collapsed.
    #[serde(default = "default_dedup_window")]
    pub dedup_window_ms: u64,
    /// Upper bound on each fallback layer before the next one is tried.
    #[serde(default = "default_playback_timeout")]
    pub playback_timeout_ms: u64,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled_by_default: true,
            ambient_volume: default_ambient_volume(),
            test_volume: default_test_volume(),
            clip_path: None,
            player_command: None,
            dedup_window_ms: default_dedup_window(),
            playback_timeout_ms: default_playback_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ambient_volume() -> f32 {
    0.3
}

fn default_test_volume() -> f32 {
    0.6
}

fn default_dedup_window() -> u64 {
    750
}

fn default_playback_timeout() -> u64 {
    3000
}
