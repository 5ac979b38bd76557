use crate::constants::NEAR_SILENCE_THRESHOLD;

/// True when any sample rises above the near-silence threshold
pub fn has_audible(samples: &[f32]) -> bool {
    samples.iter().any(|x| x.abs() > NEAR_SILENCE_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_audible() {
        assert!(!has_audible(&[]));
        assert!(!has_audible(&[0.0, 5e-5, -1e-4]));
        assert!(has_audible(&[0.0, -2e-4]));
        assert!(has_audible(&[0.3]));
    }
}
