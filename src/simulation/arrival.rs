use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{PlayoutError, Result};

/// Network delivery model for a stream of equally spaced frames
///
/// Each frame is sent at `index * frame_ms` and arrives after
/// `base_latency_ms` plus a half-normal jitter term. With probability
/// `stall_probability` a frame is held for an extra `stall_ms`; since the
/// transport delivers in order, everything behind it then arrives in a burst.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct ArrivalConfig {
    pub seed: Option<u64>,
    pub frame_ms: f32,
    pub base_latency_ms: f32,
    pub jitter_ms: f32,
    pub stall_probability: f32,
    pub stall_ms: f32,
}

impl Default for ArrivalConfig {
    fn default() -> Self {
        Self {
            seed: None,
            frame_ms: 40.0,
            base_latency_ms: 50.0,
            jitter_ms: 10.0,
            stall_probability: 0.0,
            stall_ms: 0.0,
        }
    }
}

impl ArrivalConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_jitter(mut self, jitter_ms: f32) -> Self {
        self.jitter_ms = jitter_ms;
        self
    }

    pub fn with_stalls(mut self, probability: f32, stall_ms: f32) -> Self {
        self.stall_probability = probability;
        self.stall_ms = stall_ms;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("frame_ms", self.frame_ms),
            ("base_latency_ms", self.base_latency_ms),
            ("jitter_ms", self.jitter_ms),
            ("stall_ms", self.stall_ms),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(PlayoutError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.stall_probability) {
            return Err(PlayoutError::Config(format!(
                "stall_probability must be within [0, 1], got {}",
                self.stall_probability
            )));
        }
        Ok(())
    }
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Arrival times in seconds for `frame_count` frames, non-decreasing
pub fn arrival_times(config: &ArrivalConfig, frame_count: usize) -> Result<Vec<f64>> {
    config.validate()?;
    let mut rng = create_rng(config.seed);
    let jitter = Normal::new(0.0, config.jitter_ms as f64)
        .map_err(|e| PlayoutError::Config(format!("invalid jitter_ms: {}", e)))?;
    let frame_s = config.frame_ms as f64 / 1000.0;
    let base_s = config.base_latency_ms as f64 / 1000.0;

    let mut last = f64::NEG_INFINITY;
    let times = (0..frame_count)
        .map(|i| {
            let sent = i as f64 * frame_s;
            let mut arrival = sent + base_s + jitter.sample(&mut rng).abs() / 1000.0;
            if rng.random::<f32>() < config.stall_probability {
                arrival += config.stall_ms as f64 / 1000.0;
            }
            last = last.max(arrival);
            last
        })
        .collect();
    Ok(times)
}
