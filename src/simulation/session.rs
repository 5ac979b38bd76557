use rolling_stats::Stats;
use serde::Serialize;

use crate::config::{PlayoutConfig, samples_to_ms};
use crate::error::{PlayoutError, Result};
use crate::renderer::{AudioRenderer, BufferParams, RendererObserver, Telemetry};

/// Observer that tallies renderer transitions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransitionCounts {
    pub armed: usize,
    pub resumed: usize,
    pub underruns: usize,
    pub overflow_drops: usize,
    pub dropped_samples: usize,
}

impl RendererObserver for TransitionCounts {
    fn on_armed(&mut self, _buffered: usize, _partial_buffer: usize) {
        self.armed += 1;
    }

    fn on_resumed(&mut self, _buffered: usize) {
        self.resumed += 1;
    }

    fn on_underrun(&mut self, _missing: usize, _partial_buffer: usize) {
        self.underruns += 1;
    }

    fn on_overflow_drop(&mut self, dropped: usize, _max_buffer: usize) {
        self.overflow_drops += 1;
        self.dropped_samples += dropped;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f64>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

/// Outcome of a simulated playout session
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub sample_rate: u32,
    pub pushed_samples: usize,
    pub rendered_samples: usize,
    pub duration_s: f64,
    pub transitions: TransitionCounts,
    /// Latency estimates from the telemetry stream, in seconds
    pub delay: Option<StatsSummary>,
    pub final_partial_buffer_ms: f32,
    pub final_max_buffer_ms: f32,
    pub final_telemetry: Option<Telemetry>,
    #[serde(skip)]
    pub output: Vec<f32>,
    #[serde(skip)]
    pub telemetry: Vec<Telemetry>,
}

/// Drive a renderer in virtual time
///
/// Frames are pushed when their arrival time has passed and the device pulls
/// one block every `block_size / sample_rate` seconds. The reference clock
/// passed with each frame is the sender's stream position once that frame is
/// complete, so `delay` approximates sender-to-speaker latency. The session
/// ends once every frame has been delivered and played, or after a generous
/// timeout if the renderer never drains.
///
/// # Arguments
/// * `frames` - Frames in send order
/// * `arrivals` - Arrival time of each frame in seconds (same length as `frames`)
/// * `config` - Playout configuration; `audio.sample_rate` and `audio.block_size` set the device clock
pub fn simulate_session(
    frames: &[Vec<f32>],
    arrivals: &[f64],
    config: &PlayoutConfig,
) -> Result<SessionReport> {
    if frames.len() != arrivals.len() {
        return Err(PlayoutError::Config(format!(
            "{} frames but {} arrival times",
            frames.len(),
            arrivals.len()
        )));
    }
    config.validate()?;

    let sample_rate = config.audio.sample_rate;
    let block_size = config.audio.block_size;
    let block_s = block_size as f64 / sample_rate as f64;

    let mut renderer =
        AudioRenderer::with_observer(&config.renderer, sample_rate, TransitionCounts::default())?;

    let pushed_samples: usize = frames.iter().map(Vec::len).sum();
    let last_arrival = arrivals.last().copied().unwrap_or(0.0);
    let timeout = last_arrival + 2.0 * pushed_samples as f64 / sample_rate as f64 + 1.0;

    let mut output = Vec::new();
    let mut telemetry = Vec::with_capacity(frames.len());
    let mut delay_stats: Stats<f64> = Stats::new();
    let mut sender_position = 0usize;
    let mut next = 0;
    let mut block = vec![0.0f32; block_size];
    let mut tick = 0u64;

    loop {
        let now = tick as f64 * block_s;

        while next < frames.len() && arrivals[next] <= now {
            sender_position += frames[next].len();
            let mic_duration = sender_position as f64 / sample_rate as f64;
            let report = renderer.push_frame(frames[next].clone(), mic_duration);
            delay_stats.update(report.delay);
            telemetry.push(report);
            next += 1;
        }

        if next == frames.len() && renderer.current_samples() == 0 {
            break;
        }
        if now > timeout {
            log::warn!(
                "Simulation timed out with {} samples buffered",
                renderer.current_samples()
            );
            break;
        }

        renderer.render_into(&mut block);
        output.extend_from_slice(&block);
        tick += 1;
    }

    let params: BufferParams = renderer.params();
    let rendered_samples =
        (renderer.metrics().actual_audio_played * sample_rate as f64).round() as usize;

    Ok(SessionReport {
        sample_rate,
        pushed_samples,
        rendered_samples,
        duration_s: tick as f64 * block_s,
        transitions: *renderer.observer(),
        delay: StatsSummary::from_stats(&delay_stats),
        final_partial_buffer_ms: samples_to_ms(params.partial, sample_rate),
        final_max_buffer_ms: samples_to_ms(params.max, sample_rate),
        final_telemetry: telemetry.last().copied(),
        output,
        telemetry,
    })
}
