//! Configuration for the jitterplay playout pipeline.
//!
//! All buffering parameters are expressed in milliseconds and converted to
//! sample counts once, when a renderer is built for a given sample rate.
//!
//! ## Loading from TOML
//!
//! Every section and field is optional; anything left out keeps its default:
//!
//! ```toml
//! [audio]
//! sample_rate = 48000
//! block_size = 128
//!
//! [renderer]
//! initial_buffer_ms = 80.0
//! partial_buffer_ms = 10.0
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::DEFAULT_RENDER_QUANTUM;
use crate::error::{PlayoutError, Result};

/// A buffer length given on the command line
///
/// # Parsing formats
/// - `80` - milliseconds (no suffix)
/// - `80ms` - milliseconds (explicit)
/// - `1.5s` - seconds
///
/// # Example
/// ```
/// use jitterplay::config::BufferDuration;
///
/// let d: BufferDuration = "1.5s".parse().unwrap();
/// assert!((d.as_ms() - 1500.0).abs() < 0.001);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferDuration(f32);

impl BufferDuration {
    pub fn from_ms(ms: f32) -> Self {
        Self(ms)
    }

    pub fn as_ms(&self) -> f32 {
        self.0
    }

    /// Number of whole samples this duration spans, rounded to nearest
    pub fn as_samples(&self, sample_rate: u32) -> usize {
        ms_to_samples(self.0, sample_rate)
    }
}

impl fmt::Display for BufferDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}ms", self.0)
    }
}

impl FromStr for BufferDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        let (num, scale) = if let Some(num) = s.strip_suffix("ms") {
            (num, 1.0)
        } else if let Some(num) = s.strip_suffix('s') {
            (num, 1000.0)
        } else {
            (s, 1.0)
        };

        let value: f32 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid duration: {}", s))?;
        if !value.is_finite() || value < 0.0 {
            return Err("duration must be a non-negative number".to_string());
        }
        Ok(Self::from_ms(value * scale))
    }
}

/// Convert a millisecond duration to a sample count at `sample_rate`
pub fn ms_to_samples(ms: f32, sample_rate: u32) -> usize {
    (ms as f64 * sample_rate as f64 / 1000.0).round().max(0.0) as usize
}

/// Convert a sample count to milliseconds at `sample_rate`
pub fn samples_to_ms(samples: usize, sample_rate: u32) -> f32 {
    (samples as f64 * 1000.0 / sample_rate as f64) as f32
}

/// Top-level playout configuration
///
/// Use `PlayoutConfig::default()` for the values the renderer was tuned with.
///
/// # Example
/// ```
/// use jitterplay::config::PlayoutConfig;
///
/// let mut config = PlayoutConfig::default();
/// config.renderer.initial_buffer_ms = 120.0;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlayoutConfig {
    /// Output device parameters
    pub audio: AudioConfig,
    /// Jitter buffer parameters
    pub renderer: RendererConfig,
}

/// Output audio configuration
///
/// The sample rate and block size are dictated by the host audio platform;
/// the renderer never resamples.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Output sample rate in Hz (typically 48000)
    pub sample_rate: u32,
    /// Render quantum in samples pulled per device callback step
    pub block_size: usize,
    /// Size of the frames a file source hands to the renderer, in milliseconds
    pub frame_ms: f32,
    /// Output device name, `None` for the host default
    pub device: Option<String>,
}

/// Jitter buffer configuration
///
/// `partial_buffer_ms` and `max_buffer_ms` are starting points: the renderer
/// grows them at runtime (by the increments, up to the caps) when it sees
/// underruns or overflows, and restores them on reset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Lookahead required before starting playback after a reset
    pub initial_buffer_ms: f32,
    /// Extra lookahead after the initial threshold before audio flows
    pub partial_buffer_ms: f32,
    /// Buffered audio beyond which the oldest samples are dropped
    pub max_buffer_ms: f32,
    /// Growth applied to the partial buffer after a genuine underrun
    pub partial_buffer_increment_ms: f32,
    /// Upper bound for the partial buffer
    pub partial_buffer_cap_ms: f32,
    /// Growth applied to the max buffer after an overflow drop
    pub max_buffer_increment_ms: f32,
    /// Upper bound for the max buffer after growth
    pub max_buffer_cap_ms: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: DEFAULT_RENDER_QUANTUM,
            frame_ms: 40.0,
            device: None,
        }
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            initial_buffer_ms: 80.0,
            partial_buffer_ms: 10.0,
            max_buffer_ms: 30_000.0,
            partial_buffer_increment_ms: 5.0,
            partial_buffer_cap_ms: 80.0,
            max_buffer_increment_ms: 5.0,
            max_buffer_cap_ms: 80.0,
        }
    }
}

impl PlayoutConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| PlayoutError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PlayoutError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.audio.validate()?;
        self.renderer.validate()
    }
}

impl AudioConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(PlayoutError::Config("sample_rate must be positive".into()));
        }
        if self.block_size == 0 {
            return Err(PlayoutError::Config("block_size must be positive".into()));
        }
        if !self.frame_ms.is_finite() || self.frame_ms <= 0.0 {
            return Err(PlayoutError::Config("frame_ms must be positive".into()));
        }
        Ok(())
    }

    /// Samples per frame handed out by file sources
    pub fn frame_samples(&self) -> usize {
        ms_to_samples(self.frame_ms, self.sample_rate).max(1)
    }
}

impl RendererConfig {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("initial_buffer_ms", self.initial_buffer_ms),
            ("partial_buffer_ms", self.partial_buffer_ms),
            ("max_buffer_ms", self.max_buffer_ms),
            ("partial_buffer_increment_ms", self.partial_buffer_increment_ms),
            ("partial_buffer_cap_ms", self.partial_buffer_cap_ms),
            ("max_buffer_increment_ms", self.max_buffer_increment_ms),
            ("max_buffer_cap_ms", self.max_buffer_cap_ms),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(PlayoutError::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.initial_buffer_ms <= 0.0 {
            return Err(PlayoutError::Config(
                "initial_buffer_ms must be positive".into(),
            ));
        }
        if self.partial_buffer_cap_ms < self.partial_buffer_ms {
            return Err(PlayoutError::Config(format!(
                "partial_buffer_cap_ms ({}) is below partial_buffer_ms ({})",
                self.partial_buffer_cap_ms, self.partial_buffer_ms
            )));
        }
        Ok(())
    }
}
