//! Sound alert engine.
//!
//! Plays an audible cue with layered fallback: the synthesized two-tone
//! chime, then a pre-encoded clip, then a single beep. Each layer's failure
//! or timeout is swallowed; if all fail a warning is logged. Playback never
//! errors out to the caller, and notification alerts run on their own task
//! so a slow player cannot hold up the store.

pub mod dedup;
pub mod output;
pub mod preference;
pub mod synth;

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use plantdesk_core::config::SoundConfig;
use plantdesk_core::error::AppError;
use plantdesk_core::result::AppResult;

use self::dedup::AlertDeduplicator;
use self::output::AudioOutput;
use self::preference::SoundPreference;

pub use self::output::CommandAudioOutput;

/// Which layer of the fallback chain produced sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundLayer {
    /// 880 Hz then 1320 Hz chime.
    TwoTone,
    /// Configured WAV clip.
    Clip,
    /// 660 Hz beep.
    Beep,
}

impl fmt::Display for SoundLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoTone => write!(f, "two_tone"),
            Self::Clip => write!(f, "clip"),
            Self::Beep => write!(f, "beep"),
        }
    }
}

/// Plays alert cues, honouring the persisted sound preference.
#[derive(Debug)]
pub struct SoundAlertEngine {
    output: Arc<dyn AudioOutput>,
    preference: Arc<SoundPreference>,
    dedup: AlertDeduplicator,
    clip_path: Option<PathBuf>,
    ambient_volume: f32,
    test_volume: f32,
    layer_timeout: Duration,
}

impl SoundAlertEngine {
    /// Create an engine from configuration.
    pub fn new(
        output: Arc<dyn AudioOutput>,
        preference: Arc<SoundPreference>,
        config: &SoundConfig,
    ) -> Self {
        Self {
            output,
            preference,
            dedup: AlertDeduplicator::new(config.dedup_window_ms),
            clip_path: config.clip_path.as_ref().map(PathBuf::from),
            ambient_volume: config.ambient_volume.clamp(0.0, 1.0),
            test_volume: config.test_volume.clamp(0.0, 1.0),
            layer_timeout: Duration::from_millis(config.playback_timeout_ms.max(1)),
        }
    }

    /// The preference this engine reads before every attempt.
    pub fn preference(&self) -> &Arc<SoundPreference> {
        &self.preference
    }

    /// Start an incoming-notification alert at the ambient volume.
    ///
    /// The preference and dedup window are checked before returning; the
    /// cue itself plays on a spawned task whose handle is returned. `None`
    /// means no cue was started.
    pub fn play_alert(&self) -> Option<JoinHandle<Option<SoundLayer>>> {
        if !self.preference.is_enabled() {
            debug!("Sound disabled, skipping alert");
            return None;
        }
        if !self.dedup.should_play() {
            debug!("Alert suppressed by dedup window");
            return None;
        }
        Some(tokio::spawn(self.cue(self.ambient_volume).run()))
    }

    /// Play the user-triggered test cue at the test volume.
    pub async fn play_test(&self) -> Option<SoundLayer> {
        self.play(self.test_volume).await
    }

    /// Play the cue at `volume`, clamped to [0, 1], and wait for it.
    ///
    /// Returns the layer that succeeded, or `None` when sound is disabled
    /// or every layer failed.
    pub async fn play(&self, volume: f32) -> Option<SoundLayer> {
        if !self.preference.is_enabled() {
            debug!("Sound disabled, skipping cue");
            return None;
        }
        self.cue(volume.clamp(0.0, 1.0)).run().await
    }

    /// Forget the last alert so the next one is not collapsed into it.
    pub fn reset_dedup(&self) {
        self.dedup.reset();
    }

    fn cue(&self, volume: f32) -> Cue {
        Cue {
            output: Arc::clone(&self.output),
            clip_path: self.clip_path.clone(),
            volume,
            layer_timeout: self.layer_timeout,
        }
    }
}

/// One playback of the fallback chain, detached from the engine.
struct Cue {
    output: Arc<dyn AudioOutput>,
    clip_path: Option<PathBuf>,
    volume: f32,
    layer_timeout: Duration,
}

impl Cue {
    async fn run(self) -> Option<SoundLayer> {
        let tones = self.output.play_tones(&synth::TWO_TONE_CUE, self.volume);
        match self.bounded(SoundLayer::TwoTone, tones).await {
            Ok(()) => return Some(SoundLayer::TwoTone),
            Err(e) => debug!(error = %e, "Two-tone cue failed"),
        }

        if let Some(path) = &self.clip_path {
            let clip = self.output.play_clip(path, self.volume);
            match self.bounded(SoundLayer::Clip, clip).await {
                Ok(()) => return Some(SoundLayer::Clip),
                Err(e) => debug!(error = %e, clip = %path.display(), "Sound clip failed"),
            }
        }

        let beep = self.output.beep(synth::BEEP, self.volume);
        match self.bounded(SoundLayer::Beep, beep).await {
            Ok(()) => Some(SoundLayer::Beep),
            Err(e) => {
                warn!(error = %e, "No audio layer could play the notification sound");
                None
            }
        }
    }

    async fn bounded<F>(&self, layer: SoundLayer, attempt: F) -> AppResult<()>
    where
        F: Future<Output = AppResult<()>>,
    {
        tokio::time::timeout(self.layer_timeout, attempt)
            .await
            .unwrap_or_else(|_| {
                Err(AppError::sound_playback(format!(
                    "{layer} layer did not finish within {:?}",
                    self.layer_timeout
                )))
            })
    }
}
