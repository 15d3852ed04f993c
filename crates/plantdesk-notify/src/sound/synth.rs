//! Tone synthesis and WAV encoding.

use std::time::Duration;

/// Output sample rate for synthesized cues.
pub const SAMPLE_RATE: u32 = 44_100;

/// Linear attack before the exponential decay, avoiding a click.
const ATTACK: Duration = Duration::from_millis(10);

/// Fraction of the peak level reached at the end of each tone.
const DECAY_FLOOR: f32 = 0.01;

/// A sine tone with a decaying envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    /// Pitch in hertz.
    pub frequency_hz: f32,
    /// Length of the tone.
    pub duration: Duration,
}

impl Tone {
    /// Create a tone.
    pub const fn new(frequency_hz: f32, duration: Duration) -> Self {
        Self {
            frequency_hz,
            duration,
        }
    }
}

/// The primary alert: a rising two-tone chime.
pub const TWO_TONE_CUE: [Tone; 2] = [
    Tone::new(880.0, Duration::from_millis(120)),
    Tone::new(1320.0, Duration::from_millis(120)),
];

/// The last-resort beep.
pub const BEEP: Tone = Tone::new(660.0, Duration::from_millis(180));

/// Render `tones` back to back as signed 16-bit mono samples at `volume` (0..=1).
pub fn render(tones: &[Tone], volume: f32, sample_rate: u32) -> Vec<i16> {
    let volume = volume.clamp(0.0, 1.0);
    let rate = sample_rate as f32;
    let mut samples = Vec::new();

    for tone in tones {
        let total = (tone.duration.as_secs_f32() * rate).round() as usize;
        let attack = ((ATTACK.as_secs_f32() * rate).round() as usize).min(total);
        let decay_len = total.saturating_sub(attack).max(1) as f32;

        for i in 0..total {
            let envelope = if i < attack {
                i as f32 / attack as f32
            } else {
                // Exponential ramp from 1.0 down to DECAY_FLOOR over the tone.
                DECAY_FLOOR.powf((i - attack) as f32 / decay_len)
            };
            let phase = std::f32::consts::TAU * tone.frequency_hz * i as f32 / rate;
            let value = phase.sin() * envelope * volume;
            samples.push((value * i16::MAX as f32) as i16);
        }
    }

    samples
}

/// Wrap mono 16-bit PCM samples in a RIFF/WAVE container.
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Vec<u8> {
    const CHANNELS: u16 = 1;
    const BITS_PER_SAMPLE: u16 = 16;

    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    let data_len = (samples.len() * 2) as u32;

    let mut out = Vec::with_capacity(44 + samples.len() * 2);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&CHANNELS.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for sample in samples {
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}
