use serde::Serialize;

use crate::constants::{MIN_DELAY_SENTINEL, OPUS_CLOCK_RATE};

/// Health report emitted after every pushed frame
///
/// All values are in seconds. `delay` is the caller-supplied reference
/// duration (microphone time encoded so far) minus the renderer's own
/// accounting of stream time rendered or dropped, approximating
/// capture-to-render latency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub total_audio_played: f64,
    pub actual_audio_played: f64,
    pub delay: f64,
    pub min_delay: f64,
    pub max_delay: f64,
}

/// Playback counters accumulated since the last reset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Output time elapsed since audio first played, including stutters
    pub total_audio_played: f64,
    /// Output time that carried real samples
    pub actual_audio_played: f64,
    /// Smallest buffered duration observed while playing
    pub min_delay: f64,
    /// Largest buffered duration observed while playing
    pub max_delay: f64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            total_audio_played: 0.0,
            actual_audio_played: 0.0,
            min_delay: MIN_DELAY_SENTINEL,
            max_delay: 0.0,
        }
    }
}

impl Metrics {
    pub(crate) fn observe_delay(&mut self, delay: f64) {
        self.max_delay = self.max_delay.max(delay);
        self.min_delay = self.min_delay.min(delay);
    }
}

/// Reference clock for the `delay` telemetry value
///
/// Tracks how much microphone audio the encoder has consumed, from its
/// encoded sample position. Opus encoders report positions on a 48 kHz
/// clock whatever their configured sample rate.
#[derive(Debug, Clone, Copy)]
pub struct MicClock {
    clock_rate: u32,
    position: u64,
}

impl MicClock {
    pub fn new(clock_rate: u32) -> Self {
        Self {
            clock_rate,
            position: 0,
        }
    }

    pub fn opus() -> Self {
        Self::new(OPUS_CLOCK_RATE)
    }

    /// Record the encoder's latest encoded sample position
    pub fn set_position(&mut self, encoded_samples: u64) {
        self.position = encoded_samples;
    }

    pub fn advance(&mut self, samples: u64) {
        self.position += samples;
    }

    pub fn duration_secs(&self) -> f64 {
        self.position as f64 / self.clock_rate as f64
    }
}

impl Default for MicClock {
    fn default() -> Self {
        Self::opus()
    }
}
