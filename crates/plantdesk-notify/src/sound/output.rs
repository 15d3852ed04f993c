//! Audio output backends.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use plantdesk_core::error::{AppError, ErrorKind};
use plantdesk_core::result::AppResult;

use super::synth::{self, Tone};

/// Something that can make a noise.
#[async_trait]
pub trait AudioOutput: Send + Sync + std::fmt::Debug + 'static {
    /// Synthesize and play `tones` back to back.
    async fn play_tones(&self, tones: &[Tone], volume: f32) -> AppResult<()>;

    /// Play a pre-encoded clip from disk.
    async fn play_clip(&self, path: &Path, volume: f32) -> AppResult<()>;

    /// Play the fallback beep.
    async fn beep(&self, tone: Tone, volume: f32) -> AppResult<()> {
        self.play_tones(&[tone], volume).await
    }
}

/// Plays audio by piping WAV data to an external player such as
/// `aplay -q -` or `paplay`.
///
/// Without a player only the beep works, through the terminal bell.
#[derive(Debug, Clone, Default)]
pub struct CommandAudioOutput {
    player: Option<Vec<String>>,
}

impl CommandAudioOutput {
    /// Build from a player command line, e.g. `"aplay -q -"`.
    pub fn new(player_command: Option<&str>) -> Self {
        let player = player_command
            .map(|cmd| cmd.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|parts| !parts.is_empty());
        Self { player }
    }

    /// Whether an external player is configured.
    pub fn has_player(&self) -> bool {
        self.player.is_some()
    }

    async fn pipe_to_player(&self, wav: &[u8]) -> AppResult<()> {
        let Some((program, args)) = self.player.as_ref().and_then(|p| p.split_first()) else {
            return Err(AppError::sound_playback("No audio player configured"));
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::SoundPlayback,
                    format!("Failed to start audio player '{program}'"),
                    e,
                )
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(wav).await.map_err(|e| {
                AppError::with_source(ErrorKind::SoundPlayback, "Audio player closed its input", e)
            })?;
        }

        let status = child.wait().await.map_err(|e| {
            AppError::with_source(ErrorKind::SoundPlayback, "Audio player did not finish", e)
        })?;
        if !status.success() {
            return Err(AppError::sound_playback(format!(
                "Audio player '{program}' exited with {status}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AudioOutput for CommandAudioOutput {
    async fn play_tones(&self, tones: &[Tone], volume: f32) -> AppResult<()> {
        let samples = synth::render(tones, volume, synth::SAMPLE_RATE);
        let wav = synth::encode_wav(&samples, synth::SAMPLE_RATE);
        self.pipe_to_player(&wav).await
    }

    async fn play_clip(&self, path: &Path, _volume: f32) -> AppResult<()> {
        // Clips play at their encoded level.
        let wav = tokio::fs::read(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::SoundPlayback,
                format!("Cannot read sound clip {}", path.display()),
                e,
            )
        })?;
        self.pipe_to_player(&wav).await
    }

    async fn beep(&self, tone: Tone, volume: f32) -> AppResult<()> {
        if self.has_player() {
            return self.play_tones(&[tone], volume).await;
        }

        debug!("No audio player configured, ringing terminal bell");
        let mut stderr = tokio::io::stderr();
        stderr.write_all(b"\x07").await.map_err(|e| {
            AppError::with_source(ErrorKind::SoundPlayback, "Cannot ring terminal bell", e)
        })?;
        let _ = stderr.flush().await;
        Ok(())
    }
}
