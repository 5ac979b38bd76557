#![allow(dead_code)]

use jitterplay::AudioRenderer;
use jitterplay::config::RendererConfig;
use jitterplay::renderer::{PlaybackState, RendererObserver};

/// At 1 kHz one millisecond is one sample, so configured durations read as sample counts.
pub const RATE: u32 = 1000;

pub fn renderer() -> AudioRenderer {
    AudioRenderer::new(&RendererConfig::default(), RATE).unwrap()
}

pub fn renderer_with(config: RendererConfig) -> AudioRenderer {
    AudioRenderer::new(&config, RATE).unwrap()
}

pub fn constant(value: f32, len: usize) -> Vec<f32> {
    vec![value; len]
}

/// Distinct, recognizable, never-silent samples: `base + i * 1e-3`
pub fn pattern(base: f32, len: usize) -> Vec<f32> {
    (0..len).map(|i| base + i as f32 * 1e-3).collect()
}

/// Pull silent blocks until the renderer is playing; returns the number of pulls
pub fn pull_through_partial<O: RendererObserver>(r: &mut AudioRenderer<O>, block: usize) -> usize {
    let mut pulls = 0;
    while let PlaybackState::Armed { remaining } = r.state() {
        if remaining <= 0 {
            break;
        }
        let out = r.pull_output_block(block);
        assert!(out.iter().all(|&x| x == 0.0), "armed renderer produced audio");
        pulls += 1;
    }
    pulls
}

pub fn assert_cursor_invariant<O: RendererObserver>(r: &AudioRenderer<O>) {
    match r.queue().front_len() {
        Some(front) => assert!(
            r.offset_in_first_buffer() < front,
            "offset {} not below front frame length {}",
            r.offset_in_first_buffer(),
            front
        ),
        None => {
            assert_eq!(r.offset_in_first_buffer(), 0);
            assert_eq!(r.current_samples(), 0);
        }
    }
}
