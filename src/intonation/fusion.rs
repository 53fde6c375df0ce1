use crate::config::FusionWeights;

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 100.0;

impl FusionWeights {
    /// Weighted sum of the three raw sub-scores, before clamping.
    pub fn combine(&self, phrase_final: f64, pitch_range: f64, accent_pattern: f64) -> f64 {
        phrase_final * self.phrase_final
            + pitch_range * self.pitch_range
            + accent_pattern * self.accent_pattern
    }
}

/// Clamp to 0–100 and round half up; `None` if the weighted sum is not finite.
pub fn acoustic_score(weighted: f64) -> Option<u8> {
    if !weighted.is_finite() {
        return None;
    }
    Some(weighted.clamp(SCORE_MIN, SCORE_MAX).round() as u8)
}

/// Average the external text score with the acoustic score.
pub fn final_score(text_score: u8, acoustic_score: u8) -> u8 {
    let text = (text_score as f64).min(SCORE_MAX);
    let acoustic = (acoustic_score as f64).min(SCORE_MAX);
    ((text + acoustic) / 2.0).round() as u8
}
