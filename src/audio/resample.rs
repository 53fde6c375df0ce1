use anyhow::{ensure, Result};

/// Linearly resample `samples` from `source_rate` to `target_rate`.
///
/// Stands in for the upstream transcoder when a file arrives at a rate other
/// than the scoring rate.
pub fn linear_resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Result<Vec<f32>> {
    ensure!(source_rate > 0, "source sample rate must be positive");
    ensure!(target_rate > 0, "target sample rate must be positive");
    if samples.is_empty() || source_rate == target_rate {
        return Ok(samples.to_vec());
    }
    let step = source_rate as f64 / target_rate as f64;
    let scaled_len = samples.len() as u64 * target_rate as u64;
    let output_len = scaled_len.div_ceil(source_rate as u64) as usize;
    let last_index = samples.len() - 1;
    let resampled = (0..output_len)
        .map(|i| {
            let position = i as f64 * step;
            let left = (position.floor() as usize).min(last_index);
            let right = (left + 1).min(last_index);
            let t = (position - left as f64).clamp(0.0, 1.0) as f32;
            samples[left] * (1.0 - t) + samples[right] * t
        })
        .collect();
    Ok(resampled)
}

#[cfg(test)]
mod tests {
    use super::linear_resample;

    #[test]
    fn upsampling_keeps_constant_signal() {
        let input = vec![0.5; 160];
        let resampled = linear_resample(&input, 16_000, 44_100).unwrap();
        assert_eq!(resampled.len(), 441);
        assert!(resampled.iter().all(|&sample| (sample - 0.5).abs() < 1e-6));
    }

    #[test]
    fn same_rate_is_identity() {
        let input = vec![0.1, -0.2, 0.3];
        assert_eq!(linear_resample(&input, 44_100, 44_100).unwrap(), input);
    }

    #[test]
    fn zero_rate_is_rejected() {
        assert!(linear_resample(&[0.0], 0, 44_100).is_err());
    }
}
