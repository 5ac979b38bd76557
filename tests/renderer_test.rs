mod test_signals;

use approx::assert_relative_eq;
use jitterplay::config::RendererConfig;
use jitterplay::renderer::{Metrics, PlaybackState};
use test_signals::{
    RATE, assert_cursor_invariant, constant, pattern, pull_through_partial, renderer,
    renderer_with,
};

#[test]
fn test_cursor_invariant_under_mixed_operations() {
    let mut r = renderer();
    // Small LCG so the sequence is fixed but irregular
    let mut state: u32 = 0x1234_5678;
    let mut next = move |m: u32| {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (state >> 8) % m
    };

    for step in 0..5000 {
        if next(3) == 0 {
            let len = 1 + next(120) as usize;
            let value = if next(4) == 0 { 0.0 } else { 0.3 };
            r.push_frame(constant(value, len), step as f64 / 100.0);
        } else {
            let block = 1 + next(160) as usize;
            let out = r.pull_output_block(block);
            assert_eq!(out.len(), block);
        }
        if step % 997 == 0 {
            r.reset();
        }
        assert_cursor_invariant(&r);
    }
}

#[test]
fn test_arming_threshold_is_exact() {
    let mut r = renderer();
    r.push_frame(constant(0.2, 40), 0.0);
    r.push_frame(constant(0.2, 39), 0.0);
    assert_eq!(r.current_samples(), 79);
    assert_eq!(r.state(), PlaybackState::NotStarted);

    // Pulling while not started consumes nothing
    r.pull_output_block(128);
    assert_eq!(r.current_samples(), 79);

    r.push_frame(constant(0.2, 1), 0.0);
    assert_eq!(r.state(), PlaybackState::Armed { remaining: 10 });
}

#[test]
fn test_partial_buffer_gates_output() {
    let config = RendererConfig::default();
    let mut r = jitterplay::AudioRenderer::new(&config, 48000).unwrap();
    r.push_frame(constant(0.5, 3840), 0.0);
    assert_eq!(r.state(), PlaybackState::Armed { remaining: 480 });

    // 480 samples of partial buffer at 128 per pull: four silent pulls
    for _ in 0..4 {
        let out = r.pull_output_block(128);
        assert!(out.iter().all(|&x| x == 0.0));
        assert_eq!(r.current_samples(), 3840);
    }

    let out = r.pull_output_block(128);
    assert_eq!(r.state(), PlaybackState::Playing);
    assert!(out[1..].iter().all(|&x| x > 0.0));
    assert_eq!(r.current_samples(), 3840 - 128);
}

#[test]
fn test_overflow_drops_to_target_and_grows_max() {
    let config = RendererConfig {
        max_buffer_ms: 100.0,
        max_buffer_cap_ms: 200.0,
        ..RendererConfig::default()
    };
    let mut r = renderer_with(config);

    // Threshold is 100 + 10 + 80 = 190 samples
    for i in 0..3 {
        r.push_frame(pattern(i as f32, 50), 0.0);
    }
    assert_eq!(r.current_samples(), 150);
    assert_eq!(r.params().max, 100);

    let t = r.push_frame(pattern(3.0, 50), 1.0);
    assert_eq!(r.current_samples(), 90);
    assert_eq!(r.params().max, 105);
    assert_cursor_invariant(&r);

    // 110 samples dropped count as stream time
    assert_relative_eq!(r.time_in_stream(), 0.110, epsilon = 1e-9);
    assert_relative_eq!(t.delay, 1.0 - 0.110, epsilon = 1e-9);

    // Newest audio survives: last 40 of frame 2 then all of frame 3
    pull_through_partial(&mut r, 10);
    let mut out = r.pull_output_block(90);
    // Whole block is under the fade-in ramp; its first sample is zero
    out.remove(0);
    let expected: Vec<f32> = pattern(2.0, 50)[11..]
        .iter()
        .chain(pattern(3.0, 50).iter())
        .copied()
        .collect();
    for (i, (&got, &want)) in out.iter().zip(expected.iter()).enumerate() {
        let ramp = (i + 1) as f32 / 90.0;
        assert_relative_eq!(got, want * ramp, epsilon = 1e-5);
    }
}

#[test]
fn test_max_buffer_growth_is_capped() {
    let config = RendererConfig {
        max_buffer_ms: 100.0,
        max_buffer_increment_ms: 30.0,
        max_buffer_cap_ms: 150.0,
        ..RendererConfig::default()
    };
    let mut r = renderer_with(config);

    let mut maxima = Vec::new();
    for _ in 0..4 {
        // Push well past the current threshold in one frame
        let threshold = r.params().overflow_threshold();
        r.push_frame(constant(0.1, threshold), 0.0);
        assert_eq!(r.current_samples(), r.params().drop_target());
        maxima.push(r.params().max);
    }
    assert_eq!(maxima, vec![130, 150, 150, 150]);
}

#[test]
fn test_default_max_buffer_settles_at_cap_after_first_drop() {
    let mut r = renderer();
    assert_eq!(r.params().max, 30_000);
    r.push_frame(constant(0.1, 30_090), 0.0);
    assert_eq!(r.current_samples(), 90);
    assert_eq!(r.params().max, 80);
}

#[test]
fn test_underrun_fades_out_and_rearms() {
    let mut r = renderer();
    r.push_frame(constant(0.5, 80), 0.0);
    pull_through_partial(&mut r, 10);
    r.pull_output_block(64);
    assert_eq!(r.current_samples(), 16);

    let out = r.pull_output_block(32);
    assert_eq!(r.state(), PlaybackState::NotStarted);
    assert_eq!(r.params().partial, 15);

    assert_relative_eq!(out[0], 0.5);
    for pair in out[..16].windows(2) {
        assert!(pair[1] < pair[0], "fade-out must be strictly decreasing");
    }
    assert_relative_eq!(out[15], 0.5 / 16.0, epsilon = 1e-6);
    assert!(out[16..].iter().all(|&x| x == 0.0));

    // Re-arming uses the grown partial buffer
    r.push_frame(constant(0.5, 80), 0.0);
    assert_eq!(r.state(), PlaybackState::Armed { remaining: 15 });
}

#[test]
fn test_partial_growth_is_capped() {
    let mut r = renderer();
    for _ in 0..30 {
        r.push_frame(constant(0.5, 80), 0.0);
        pull_through_partial(&mut r, 10);
        // Drain with a block larger than what is queued
        r.pull_output_block(128);
        assert_eq!(r.state(), PlaybackState::NotStarted);
    }
    assert_eq!(r.params().partial, 80);
}

#[test]
fn test_block_aligned_exhaustion_is_not_an_underrun() {
    let mut r = renderer();
    r.push_frame(constant(0.5, 80), 0.0);
    pull_through_partial(&mut r, 10);
    for _ in 0..8 {
        r.pull_output_block(10);
    }
    assert_eq!(r.current_samples(), 0);

    // The queue ran dry exactly on a block boundary: the next pull finds
    // nothing to play, which is silence rather than a short copy
    let out = r.pull_output_block(10);
    assert!(out.iter().all(|&x| x == 0.0));
    assert_eq!(r.state(), PlaybackState::Playing);
    assert_eq!(r.params().partial, 10);

    // Audio that arrives later plays straight away
    r.push_frame(constant(0.25, 10), 0.0);
    let out = r.pull_output_block(10);
    assert!(out.iter().all(|&x| x == 0.25));
}

#[test]
fn test_silent_shortfall_does_not_adapt() {
    for level in [0.0, 5e-5, -1e-4] {
        let mut r = renderer();
        r.push_frame(constant(level, 80), 0.0);
        pull_through_partial(&mut r, 10);
        r.pull_output_block(64);

        r.pull_output_block(32);
        assert_eq!(r.params().partial, 10, "level {}", level);
        assert_eq!(r.state(), PlaybackState::Playing, "level {}", level);

        // The pause ends: audio resumes immediately without re-arming
        r.push_frame(constant(0.5, 20), 0.0);
        let out = r.pull_output_block(8);
        assert!(out.iter().all(|&x| x == 0.5), "level {}", level);
    }
}

#[test]
fn test_fade_in_on_first_output() {
    let mut r = renderer();
    r.push_frame(constant(0.8, 200), 0.0);
    pull_through_partial(&mut r, 10);

    let out = r.pull_output_block(64);
    assert_eq!(out[0], 0.0);
    for pair in out.windows(2) {
        assert!(pair[1] > pair[0], "fade-in must be strictly increasing");
    }
    assert_relative_eq!(out[63], 0.8 * 63.0 / 64.0, epsilon = 1e-6);

    // Only the first block is faded
    let out = r.pull_output_block(64);
    assert!(out.iter().all(|&x| x == 0.8));
}

#[test]
fn test_frames_play_in_order_for_any_block_size() {
    let a = pattern(1.0, 37);
    let b = pattern(2.0, 5);
    let c = pattern(3.0, 91);
    let expected: Vec<f32> = [a.clone(), b.clone(), c.clone()].concat();

    for block in [1, 3, 7, 16, 50, 128] {
        let mut r = renderer();
        // A silent lead-in absorbs the fade-in, a silent tail absorbs the final shortfall
        r.push_frame(constant(0.0, 128), 0.0);
        r.push_frame(a.clone(), 0.0);
        r.push_frame(b.clone(), 0.0);
        r.push_frame(c.clone(), 0.0);
        r.push_frame(constant(0.0, 128), 0.0);

        let mut output = Vec::new();
        while r.current_samples() > 0 || !matches!(r.state(), PlaybackState::Playing) {
            output.extend(r.pull_output_block(block));
            assert!(output.len() < 10_000, "renderer never drained");
        }

        let start = output.iter().position(|&x| x != 0.0).unwrap();
        assert_eq!(output[start..start + expected.len()], expected[..], "block {}", block);
        assert_eq!(r.params().partial, 10);
    }
}

#[test]
fn test_stutter_time_counts_toward_total_only() {
    let mut r = renderer();
    r.push_frame(constant(0.5, 80), 0.0);
    pull_through_partial(&mut r, 10);
    r.pull_output_block(100);
    let after_underrun = r.metrics();
    assert_relative_eq!(after_underrun.actual_audio_played, 0.080, epsilon = 1e-9);
    assert_relative_eq!(after_underrun.total_audio_played, 0.100, epsilon = 1e-9);

    for _ in 0..5 {
        r.pull_output_block(10);
    }
    let m = r.metrics();
    assert_relative_eq!(m.actual_audio_played, 0.080, epsilon = 1e-9);
    assert_relative_eq!(m.total_audio_played, 0.150, epsilon = 1e-9);
}

#[test]
fn test_min_max_delay_track_buffered_duration() {
    let mut r = renderer();
    r.push_frame(constant(0.5, 300), 0.0);
    pull_through_partial(&mut r, 10);
    for _ in 0..10 {
        r.pull_output_block(20);
    }
    let m = r.metrics();
    assert_relative_eq!(m.max_delay, 0.300, epsilon = 1e-9);
    assert_relative_eq!(m.min_delay, 0.120, epsilon = 1e-9);
}

#[test]
fn test_reset_is_idempotent_and_restores_defaults() {
    let config = RendererConfig {
        max_buffer_ms: 100.0,
        max_buffer_cap_ms: 200.0,
        ..RendererConfig::default()
    };
    let mut r = renderer_with(config);

    // Adapt both parameters
    r.push_frame(constant(0.5, 80), 0.0);
    pull_through_partial(&mut r, 10);
    r.pull_output_block(128);
    r.push_frame(constant(0.5, 400), 0.0);
    assert_ne!(r.params(), r.default_params());

    r.reset();
    let snapshot = |r: &jitterplay::AudioRenderer| {
        (
            r.current_samples(),
            r.offset_in_first_buffer(),
            r.state(),
            r.params(),
            r.metrics(),
            r.time_in_stream(),
            r.packet_count(),
        )
    };
    let once = snapshot(&r);
    r.reset();
    let twice = snapshot(&r);
    assert_eq!(once, twice);

    assert_eq!(r.current_samples(), 0);
    assert_eq!(r.state(), PlaybackState::NotStarted);
    assert_eq!(r.params(), r.default_params());
    assert_eq!(r.params().partial, 10);
    assert_eq!(r.params().max, 100);
    assert_eq!(r.params().initial, 80);
    assert_eq!(r.metrics(), Metrics::default());
    assert_eq!(r.packet_count(), 0);
    assert_eq!(r.sample_rate(), RATE);
}

#[test]
fn test_reset_discards_audio_mid_playback() {
    let mut r = renderer();
    r.push_frame(constant(0.5, 500), 0.0);
    pull_through_partial(&mut r, 10);
    r.pull_output_block(64);
    r.reset();

    let out = r.pull_output_block(64);
    assert!(out.iter().all(|&x| x == 0.0));
    assert_eq!(r.metrics().total_audio_played, 0.0);
}
