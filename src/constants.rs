//! Fixed constants for the playout pipeline
//!
//! Values here are structural: they are not part of the tunable
//! configuration and never change over the life of a renderer.

/// Absolute amplitude at or below which a sample counts as silence.
/// A shortfall whose copied samples are all below this is treated as the
/// natural end of an utterance rather than an underrun.
pub const NEAR_SILENCE_THRESHOLD: f32 = 1e-4;

/// Sentinel for `min_delay` before any playable block has been observed (seconds).
pub const MIN_DELAY_SENTINEL: f64 = 2000.0;

/// Number of packets after a reset reported to the observer's `on_frame` hook.
pub const DEBUG_PACKET_LIMIT: u64 = 20;

/// Opus always runs its internal clock at 48 kHz regardless of the
/// configured encoder sample rate.
pub const OPUS_CLOCK_RATE: u32 = 48_000;

/// Typical audio platform render quantum in samples.
pub const DEFAULT_RENDER_QUANTUM: usize = 128;
