pub mod audio;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod output;
pub mod renderer;
pub mod signal_processing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::PlayoutConfig;
pub use engine::{RenderEngine, RendererCommand, RendererHandle, render_channel};
pub use error::{PlayoutError, Result};
pub use renderer::{AudioRenderer, PlaybackState, Telemetry};
pub use wav::save_wav;
