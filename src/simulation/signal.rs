use std::f32::consts::PI;

/// Sine tone
pub fn tone(freq_hz: f32, amplitude: f32, duration_s: f32, sample_rate: u32) -> Vec<f32> {
    let n = (duration_s * sample_rate as f32) as usize;
    (0..n)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f32 / sample_rate as f32).sin())
        .collect()
}

/// Alternating bursts of tone and digital silence, like turns of speech
///
/// The stream ends on a pause so the renderer sees the natural end of an
/// utterance rather than a stall.
pub fn utterances(count: usize, talk_s: f32, pause_s: f32, sample_rate: u32) -> Vec<f32> {
    let burst = tone(220.0, 0.5, talk_s, sample_rate);
    let pause = vec![0.0; (pause_s * sample_rate as f32) as usize];
    let mut out = Vec::with_capacity(count * (burst.len() + pause.len()));
    for _ in 0..count {
        out.extend_from_slice(&burst);
        out.extend_from_slice(&pause);
    }
    out
}

/// Split a signal into frames of `frame_size`, the last one possibly shorter
pub fn split_frames(samples: &[f32], frame_size: usize) -> Vec<Vec<f32>> {
    samples
        .chunks(frame_size.max(1))
        .map(|c| c.to_vec())
        .collect()
}
