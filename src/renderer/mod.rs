//! Adaptive jitter-buffered audio renderer
//!
//! Smooths a bursty stream of variable-length PCM frames into the steady,
//! fixed-size pulls of an audio device. Playback starts in two stages:
//! frames are queued until `initial` samples of lookahead exist, then a
//! further `partial` samples worth of device pulls are answered with silence
//! before audio flows. The partial buffer grows after each genuine underrun
//! and the max buffer grows after each overflow drop, so the renderer
//! converges on the jitter of the network path it is fed from.

mod observer;
mod telemetry;

pub use observer::{LogObserver, NoopObserver, RendererObserver};
pub use telemetry::{Metrics, MicClock, Telemetry};

use crate::audio::FrameQueue;
use crate::config::{RendererConfig, ms_to_samples};
use crate::constants::DEBUG_PACKET_LIMIT;
use crate::error::{PlayoutError, Result};
use crate::signal_processing::{fade_in, fade_out, has_audible};

/// Where the renderer is in its start-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Waiting for the initial lookahead to accumulate
    NotStarted,
    /// Initial lookahead reached; answering pulls with silence until
    /// `remaining` partial-buffer samples have elapsed
    Armed { remaining: isize },
    /// Audio flows to the output
    Playing,
}

/// Buffering thresholds in samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferParams {
    pub initial: usize,
    pub partial: usize,
    pub max: usize,
    pub partial_increment: usize,
    pub partial_cap: usize,
    pub max_increment: usize,
    pub max_cap: usize,
}

impl BufferParams {
    pub fn from_config(config: &RendererConfig, sample_rate: u32) -> Self {
        Self {
            initial: ms_to_samples(config.initial_buffer_ms, sample_rate),
            partial: ms_to_samples(config.partial_buffer_ms, sample_rate),
            max: ms_to_samples(config.max_buffer_ms, sample_rate),
            partial_increment: ms_to_samples(config.partial_buffer_increment_ms, sample_rate),
            partial_cap: ms_to_samples(config.partial_buffer_cap_ms, sample_rate),
            max_increment: ms_to_samples(config.max_buffer_increment_ms, sample_rate),
            max_cap: ms_to_samples(config.max_buffer_cap_ms, sample_rate),
        }
    }

    /// Buffered sample count at which the oldest audio is dropped
    pub fn overflow_threshold(&self) -> usize {
        self.max + self.partial + self.initial
    }

    /// Buffered sample count left after an overflow drop
    pub fn drop_target(&self) -> usize {
        self.initial + self.partial
    }

    fn grow_partial(&mut self) {
        self.partial = (self.partial + self.partial_increment).min(self.partial_cap);
    }

    fn grow_max(&mut self) {
        self.max = (self.max + self.max_increment).min(self.max_cap);
    }
}

/// Jitter buffer feeding a pull-driven audio output
///
/// `push_frame` and `render_into` must be called from the same thread (or
/// otherwise serialized); see [`crate::engine::RenderEngine`] for the
/// channel-fed wrapper used on the audio callback thread.
pub struct AudioRenderer<O: RendererObserver = NoopObserver> {
    sample_rate: u32,
    defaults: BufferParams,
    params: BufferParams,
    queue: FrameQueue,
    state: PlaybackState,
    first_out: bool,
    time_in_stream: f64,
    metrics: Metrics,
    packet_count: u64,
    observer: O,
}

impl AudioRenderer {
    /// Create a renderer with no observer
    ///
    /// # Arguments
    /// * `config` - Buffering parameters in milliseconds
    /// * `sample_rate` - Output sample rate in Hz
    pub fn new(config: &RendererConfig, sample_rate: u32) -> Result<Self> {
        Self::with_observer(config, sample_rate, NoopObserver)
    }
}

impl<O: RendererObserver> AudioRenderer<O> {
    pub fn with_observer(config: &RendererConfig, sample_rate: u32, observer: O) -> Result<Self> {
        if sample_rate == 0 {
            return Err(PlayoutError::Config("sample_rate must be positive".into()));
        }
        config.validate()?;

        let defaults = BufferParams::from_config(config, sample_rate);
        Ok(Self {
            sample_rate,
            defaults,
            params: defaults,
            queue: FrameQueue::new(),
            state: PlaybackState::NotStarted,
            first_out: false,
            time_in_stream: 0.0,
            metrics: Metrics::default(),
            packet_count: 0,
            observer,
        })
    }

    /// Queue a decoded frame and report renderer health
    ///
    /// # Arguments
    /// * `frame` - PCM samples in playback order; empty frames are ignored
    /// * `mic_duration` - Reference clock in seconds, used for the `delay` value
    pub fn push_frame(&mut self, frame: Vec<f32>, mic_duration: f64) -> Telemetry {
        let frame_len = frame.len();
        self.queue.push(frame);

        if self.state == PlaybackState::NotStarted && self.queue.len() >= self.params.initial {
            self.start();
        }

        if self.packet_count < DEBUG_PACKET_LIMIT {
            self.observer
                .on_frame(self.packet_count, self.queue.len(), frame_len);
        }
        self.packet_count += 1;

        if self.queue.len() >= self.params.overflow_threshold() {
            let dropped = self.queue.drop_oldest_to(self.params.drop_target());
            self.time_in_stream += dropped as f64 / self.sample_rate as f64;
            self.params.grow_max();
            self.observer.on_overflow_drop(dropped, self.params.max);
        }

        self.telemetry(mic_duration)
    }

    fn start(&mut self) {
        self.state = PlaybackState::Armed {
            remaining: self.params.partial as isize,
        };
        self.first_out = true;
        self.observer.on_armed(self.queue.len(), self.params.partial);
    }

    /// Fill `out` with the next block of output
    ///
    /// Never allocates. The whole slice is always written: real samples when
    /// playing, zeros otherwise or past the point where the queue ran dry.
    pub fn render_into(&mut self, out: &mut [f32]) {
        let block_len = out.len();
        let sample_rate = self.sample_rate as f64;

        if let PlaybackState::Armed { remaining } = self.state {
            if remaining <= 0 {
                self.state = PlaybackState::Playing;
            }
        }

        let buffered = self.queue.len() as f64 / sample_rate;
        let can_play = self.state == PlaybackState::Playing && !self.queue.is_empty();

        if !can_play {
            out.fill(0.0);
            if self.metrics.actual_audio_played > 0.0 {
                self.metrics.total_audio_played += block_len as f64 / sample_rate;
            }
            if let PlaybackState::Armed { remaining } = &mut self.state {
                *remaining -= block_len as isize;
            }
            return;
        }

        self.metrics.observe_delay(buffered);

        if self.first_out {
            self.observer.on_resumed(self.queue.len());
        }

        let copied = self.queue.read_into(out);
        out[copied..].fill(0.0);
        let audible = has_audible(&out[..copied]);

        if self.first_out {
            self.first_out = false;
            fade_in(&mut out[..copied]);
        }

        // A short block of near-silence is the tail of an utterance, not a stall
        if copied < block_len && audible {
            fade_out(&mut out[..copied]);
            self.params.grow_partial();
            self.state = PlaybackState::NotStarted;
            self.observer
                .on_underrun(block_len - copied, self.params.partial);
        }

        self.metrics.total_audio_played += block_len as f64 / sample_rate;
        self.metrics.actual_audio_played += copied as f64 / sample_rate;
        self.time_in_stream += copied as f64 / sample_rate;
    }

    /// Allocating convenience wrapper around [`render_into`](Self::render_into)
    pub fn pull_output_block(&mut self, block_len: usize) -> Vec<f32> {
        let mut out = vec![0.0; block_len];
        self.render_into(&mut out);
        out
    }

    /// Discard all buffered audio and restart from scratch
    ///
    /// Restores the adaptive partial and max buffers to their configured
    /// values so one noisy session does not carry over to the next.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.state = PlaybackState::NotStarted;
        self.first_out = false;
        self.time_in_stream = 0.0;
        self.metrics = Metrics::default();
        self.packet_count = 0;
        self.params.partial = self.defaults.partial;
        self.params.max = self.defaults.max;
        self.observer.on_reset();
    }

    pub fn telemetry(&self, mic_duration: f64) -> Telemetry {
        Telemetry {
            total_audio_played: self.metrics.total_audio_played,
            actual_audio_played: self.metrics.actual_audio_played,
            delay: mic_duration - self.time_in_stream,
            min_delay: self.metrics.min_delay,
            max_delay: self.metrics.max_delay,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Unread samples across all queued frames
    pub fn current_samples(&self) -> usize {
        self.queue.len()
    }

    pub fn offset_in_first_buffer(&self) -> usize {
        self.queue.offset_in_first_frame()
    }

    pub fn queue(&self) -> &FrameQueue {
        &self.queue
    }

    /// Frames the renderer has finished with, for release off the audio thread
    pub fn take_spent_frames(&mut self) -> std::vec::Drain<'_, Vec<f32>> {
        self.queue.take_spent()
    }

    /// Current, possibly adapted, buffering thresholds
    pub fn params(&self) -> BufferParams {
        self.params
    }

    /// Thresholds as configured, before any adaptation
    pub fn default_params(&self) -> BufferParams {
        self.defaults
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    /// Seconds of stream played or dropped since the last reset
    pub fn time_in_stream(&self) -> f64 {
        self.time_in_stream
    }

    /// Frames pushed since the last reset
    pub fn packet_count(&self) -> u64 {
        self.packet_count
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}
