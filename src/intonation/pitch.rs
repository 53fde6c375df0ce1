use tracing::debug;

use crate::config::IntonationConfig;
use crate::types::PitchSegment;

/// YIN fundamental-frequency estimator (de Cheveigné & Kawahara, 2002).
///
/// Each window is analysed over the largest power of two strictly below its
/// length, with lags up to half of that. For the default 2048-sample window at
/// 44.1 kHz this covers roughly 86 Hz upwards.
///
/// Lag 1 contributes its true difference to the running mean. Silence, DC and
/// faint unpitched noise therefore never dip below the threshold and yield no
/// pitch, where a pitchfinder-style detector would report a spurious estimate
/// near the Nyquist frequency.
#[derive(Debug, Clone, Copy)]
pub struct YinDetector {
    sample_rate: u32,
    threshold: f32,
}

impl YinDetector {
    pub fn new(sample_rate: u32, threshold: f32) -> Self {
        Self {
            sample_rate,
            threshold,
        }
    }

    pub fn from_config(config: &IntonationConfig) -> Self {
        Self::new(config.sample_rate, config.yin_threshold)
    }

    /// Estimated pitch in Hz, or `None` when the window carries no periodicity.
    pub fn detect(&self, window: &[f32]) -> Option<f64> {
        let lag_count = analysis_length(window.len()) / 2;
        if lag_count < 3 {
            return None;
        }
        let cmnd = cumulative_mean_normalized_difference(window, lag_count)?;
        let tau = absolute_threshold(&cmnd, self.threshold)?;
        let period = parabolic_interpolation(&cmnd, tau);
        let pitch = self.sample_rate as f64 / period;
        (pitch.is_finite() && pitch > 0.0).then_some(pitch)
    }
}

fn analysis_length(window_len: usize) -> usize {
    window_len.next_power_of_two() / 2
}

/// Returns `None` when the difference function is zero at every lag (silence or DC).
fn cumulative_mean_normalized_difference(window: &[f32], lag_count: usize) -> Option<Vec<f32>> {
    let reference = &window[..lag_count];
    let mut cmnd = vec![1.0_f32; lag_count];
    let mut running_sum = 0.0_f32;
    for tau in 1..lag_count {
        let diff: f32 = reference
            .iter()
            .zip(&window[tau..tau + lag_count])
            .map(|(a, b)| {
                let delta = a - b;
                delta * delta
            })
            .sum();
        running_sum += diff;
        if running_sum > 0.0 {
            cmnd[tau] = diff * tau as f32 / running_sum;
        }
    }
    (running_sum > 0.0 && running_sum.is_finite()).then_some(cmnd)
}

/// First lag dipping below the threshold, followed down to its local minimum.
fn absolute_threshold(cmnd: &[f32], threshold: f32) -> Option<usize> {
    let mut tau = 2;
    while tau < cmnd.len() {
        if cmnd[tau] < threshold {
            while tau + 1 < cmnd.len() && cmnd[tau + 1] < cmnd[tau] {
                tau += 1;
            }
            return Some(tau);
        }
        tau += 1;
    }
    None
}

fn parabolic_interpolation(cmnd: &[f32], tau: usize) -> f64 {
    let x0 = tau - 1;
    let x2 = if tau + 1 < cmnd.len() { tau + 1 } else { tau };
    if x2 == tau {
        return if cmnd[tau] <= cmnd[x0] {
            tau as f64
        } else {
            x0 as f64
        };
    }
    let (s0, s1, s2) = (cmnd[x0] as f64, cmnd[tau] as f64, cmnd[x2] as f64);
    let denom = 2.0 * (2.0 * s1 - s2 - s0);
    if denom == 0.0 {
        tau as f64
    } else {
        tau as f64 + (s2 - s0) / denom
    }
}

/// Root-mean-square over the nominal window length, so a short final window
/// reads quieter in proportion to its missing samples.
pub fn window_intensity(window: &[f32], window_size: usize) -> f64 {
    let energy: f64 = window.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (energy / window_size.max(1) as f64).sqrt()
}

/// Slide non-overlapping windows across `samples` and keep the voiced ones.
pub fn extract_segments(samples: &[f32], config: &IntonationConfig) -> Vec<PitchSegment> {
    let window_size = config.window_size.max(1);
    let detector = YinDetector::from_config(config);
    let mut window_count = 0usize;
    let segments: Vec<PitchSegment> = samples
        .chunks(window_size)
        .inspect(|_| window_count += 1)
        .filter_map(|window| {
            let pitch = detector.detect(window)?;
            Some(PitchSegment::new(
                pitch,
                window_intensity(window, window_size),
            ))
        })
        .collect();
    debug!(
        windows = window_count,
        voiced = segments.len(),
        first_pitch = ?segments.first().map(|s| s.pitch),
        "pitch extraction finished"
    );
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const RATE: u32 = 44_100;

    fn sine(frequency: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * frequency * i as f32 / RATE as f32).sin() * 0.5)
            .collect()
    }

    #[test]
    fn detects_pure_tone() {
        let detector = YinDetector::new(RATE, 0.1);
        let pitch = detector.detect(&sine(220.0, 2048)).unwrap();
        assert!((pitch - 220.0).abs() < 2.0, "pitch={pitch}");
    }

    #[test]
    fn silence_has_no_pitch() {
        let detector = YinDetector::new(RATE, 0.1);
        assert!(detector.detect(&[0.0; 2048]).is_none());
        assert!(detector.detect(&[0.3; 2048]).is_none());
    }

    #[test]
    fn faint_noise_has_no_pitch() {
        let mut state = 0x2545_F491_4F6C_DD1D_u64;
        let noise: Vec<f32> = (0..2048)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                ((state % 7) as f32 - 3.0) / 32768.0
            })
            .collect();
        assert!(noise.iter().any(|&s| s != 0.0));
        assert!(YinDetector::new(RATE, 0.1).detect(&noise).is_none());
    }

    #[test]
    fn tiny_windows_have_no_pitch() {
        let detector = YinDetector::new(RATE, 0.1);
        assert!(detector.detect(&[]).is_none());
        assert!(detector.detect(&[0.5]).is_none());
        assert!(detector.detect(&[0.5, -0.5, 0.5, -0.5]).is_none());
    }

    #[test]
    fn analysis_length_is_power_of_two_below_window() {
        assert_eq!(analysis_length(2048), 1024);
        assert_eq!(analysis_length(2000), 1024);
        assert_eq!(analysis_length(136), 128);
        assert_eq!(analysis_length(1), 0);
    }

    #[test]
    fn intensity_uses_nominal_window() {
        let full = window_intensity(&[0.5; 2048], 2048);
        assert!((full - 0.5).abs() < 1e-9);
        let partial = window_intensity(&[0.5; 512], 2048);
        assert!((partial - 0.25).abs() < 1e-9);
    }

    #[test]
    fn extraction_keeps_window_order_and_drops_silence() {
        let config = IntonationConfig::default();
        let mut samples = sine(150.0, 2048);
        samples.extend(vec![0.0; 2048]);
        samples.extend(sine(300.0, 2048));
        let segments = extract_segments(&samples, &config);
        assert_eq!(segments.len(), 2);
        assert!((segments[0].pitch - 150.0).abs() < 2.0);
        assert!((segments[1].pitch - 300.0).abs() < 3.0);
        assert!(segments.iter().all(|s| s.intensity > 0.3));
    }

    #[test]
    fn empty_buffer_has_no_segments() {
        assert!(extract_segments(&[], &IntonationConfig::default()).is_empty());
    }
}
