/// Linear fade-in across `samples`
///
/// Sample `i` of `n` is scaled by `i / n`, so the first sample is silenced
/// and the last reaches `(n - 1) / n` of its original value.
pub fn fade_in(samples: &mut [f32]) {
    let n = samples.len() as f32;
    for (i, sample) in samples.iter_mut().enumerate() {
        *sample *= i as f32 / n;
    }
}

/// Linear fade-out across `samples`
///
/// Sample `i` of `n` is scaled by `(n - i) / n`: the first sample is left
/// unchanged and the ramp approaches zero at the end.
pub fn fade_out(samples: &mut [f32]) {
    let n = samples.len() as f32;
    for (i, sample) in samples.iter_mut().enumerate() {
        *sample *= (n - i as f32) / n;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fade_in_ramps_from_zero() {
        let mut samples = vec![1.0; 4];
        fade_in(&mut samples);
        assert_eq!(samples, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_fade_out_ramps_toward_zero() {
        let mut samples = vec![0.8; 4];
        fade_out(&mut samples);
        assert_relative_eq!(samples[0], 0.8, epsilon = 1e-6);
        assert_relative_eq!(samples[1], 0.6, epsilon = 1e-6);
        assert_relative_eq!(samples[2], 0.4, epsilon = 1e-6);
        assert_relative_eq!(samples[3], 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_fades_on_empty_slice() {
        let mut samples: Vec<f32> = vec![];
        fade_in(&mut samples);
        fade_out(&mut samples);
        assert!(samples.is_empty());
    }
}
