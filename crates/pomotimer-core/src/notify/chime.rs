//! Completion chime: four ascending sine notes (C5, E5, G5, C6).
//!
//! Each note ramps linearly to its peak, then decays exponentially towards
//! a floor gain and stops. The chime is plain data so any audio backend can
//! play it, and [`Chime::render`] turns it into mono PCM.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

pub const CHIME_FREQUENCIES_HZ: [f64; 4] = [523.25, 659.25, 783.99, 1046.50];
pub const NOTE_STAGGER_S: f64 = 0.15;
pub const NOTE_DURATION_S: f64 = 0.3;
/// Highest sample rate accepted for rendering.
pub const MAX_SAMPLE_RATE: u32 = 192_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub attack_s: f64,
    pub peak_gain: f64,
    /// Gain reached at the end of the exponential decay.
    pub floor_gain: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack_s: 0.05,
            peak_gain: 0.3,
            floor_gain: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChimeNote {
    pub frequency_hz: f64,
    /// Offset from the start of the chime.
    pub start_s: f64,
    pub duration_s: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chime {
    pub notes: Vec<ChimeNote>,
    pub envelope: Envelope,
}

impl Default for Chime {
    fn default() -> Self {
        let notes = CHIME_FREQUENCIES_HZ
            .iter()
            .enumerate()
            .map(|(i, &frequency_hz)| ChimeNote {
                frequency_hz,
                start_s: i as f64 * NOTE_STAGGER_S,
                duration_s: NOTE_DURATION_S,
            })
            .collect();
        Self {
            notes,
            envelope: Envelope::default(),
        }
    }
}

impl Chime {
    /// Time from the first note's start to the last note's end.
    pub fn duration_s(&self) -> f64 {
        self.notes
            .iter()
            .map(|n| n.start_s + n.duration_s)
            .fold(0.0, f64::max)
    }

    /// Gain of `note` at `t` seconds after the chime starts.
    pub fn gain_at(&self, note: &ChimeNote, t: f64) -> f64 {
        let local = t - note.start_s;
        if local < 0.0 || local >= note.duration_s {
            return 0.0;
        }
        let env = &self.envelope;
        if local < env.attack_s {
            return env.peak_gain * local / env.attack_s;
        }
        let decay_len = note.duration_s - env.attack_s;
        if decay_len <= 0.0 {
            return env.peak_gain;
        }
        let progress = (local - env.attack_s) / decay_len;
        env.peak_gain * (env.floor_gain / env.peak_gain).powf(progress)
    }

    /// Render to mono samples in `[-1, 1]`.
    pub fn render(&self, sample_rate: u32) -> Vec<f32> {
        let rate = f64::from(sample_rate.max(1));
        let len = (self.duration_s() * rate).ceil() as usize;
        (0..len)
            .map(|i| {
                let t = i as f64 / rate;
                let sample: f64 = self
                    .notes
                    .iter()
                    .map(|note| {
                        let phase = 2.0 * PI * note.frequency_hz * (t - note.start_s);
                        self.gain_at(note, t) * phase.sin()
                    })
                    .sum();
                sample.clamp(-1.0, 1.0) as f32
            })
            .collect()
    }
}

/// Encode mono samples as a 16-bit PCM WAV file.
///
/// Returns `None` if the data does not fit the 32-bit RIFF size fields.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Option<Vec<u8>> {
    const CHANNELS: u16 = 1;
    const BITS: u16 = 16;
    let block_align = CHANNELS * BITS / 8;
    let byte_rate = sample_rate.checked_mul(u32::from(block_align))?;
    let data_len = samples
        .len()
        .checked_mul(usize::from(block_align))
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| n.checked_add(36).is_some())?;

    let mut out = Vec::with_capacity(44 + data_len as usize);
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
    out.extend_from_slice(&BITS.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        let v = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }
    Some(out)
}
