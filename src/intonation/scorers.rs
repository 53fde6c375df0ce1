//! The three intonation heuristics.
//!
//! Each scorer returns a nominal 0–100 value without clamping; fusion clamps
//! the weighted sum, so intermediate values are kept exactly as computed.

use super::phrases::mean;
use crate::types::{Phrase, PitchSegment};

const RISE_BASE: f64 = 80.0;
const RISE_BONUS_CAP: f64 = 20.0;
const RISE_BONUS_PER_PERCENT: f64 = 2.0;
const SUSTAIN_SCORE: f64 = 70.0;
const FALL_BASE: f64 = 60.0;
const FALL_LIMIT_PERCENT: f64 = -10.0;

const RANGE_REFERENCE_HZ: f64 = 100.0;
const RANGE_REFERENCE_SCORE: f64 = 80.0;
const RANGE_CAP: f64 = 100.0;

const ACCENTED_PHRASE_SCORE: f64 = 100.0;
const PLAIN_PHRASE_SCORE: f64 = 50.0;
const MIN_ACCENT_PHRASE_LEN: usize = 3;

/// Percentage pitch change from the first half of `pitches` to the second.
///
/// Halves take `len / 2` values from each end, so an odd middle value counts
/// toward neither. Fewer than two values is no movement.
pub fn pitch_movement(pitches: &[f64]) -> f64 {
    if pitches.len() < 2 {
        return 0.0;
    }
    let half = pitches.len() / 2;
    let first = mean(pitches[..half].iter().copied());
    let last = mean(pitches[pitches.len() - half..].iter().copied());
    (last - first) / first * 100.0
}

/// Score the utterance-final contour: rising beats sustained beats falling.
///
/// Note the curve is stepped at 0 % and −10 %.
pub fn phrase_final_score(segments: &[PitchSegment], tail_fraction: f64) -> f64 {
    let tail_start = (segments.len() as f64 * (1.0 - tail_fraction)).floor() as usize;
    let tail: Vec<f64> = segments[tail_start.min(segments.len())..]
        .iter()
        .map(|s| s.pitch)
        .collect();
    contour_score(pitch_movement(&tail))
}

pub fn contour_score(delta: f64) -> f64 {
    if delta > 0.0 {
        RISE_BASE + (delta * RISE_BONUS_PER_PERCENT).min(RISE_BONUS_CAP)
    } else if delta > FALL_LIMIT_PERCENT {
        SUSTAIN_SCORE
    } else {
        (FALL_BASE + delta).max(0.0)
    }
}

/// Wider overall pitch excursion scores higher; saturates at 125 Hz.
pub fn pitch_range_score(segments: &[PitchSegment]) -> f64 {
    let (min, max) = segments
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), s| {
            (min.min(s.pitch), max.max(s.pitch))
        });
    let range = max - min;
    (range / RANGE_REFERENCE_HZ * RANGE_REFERENCE_SCORE).min(RANGE_CAP)
}

/// Whether the phrase opens or closes noticeably above its own mean pitch.
pub fn has_accent_peak(phrase: &[PitchSegment], peak_ratio: f64) -> bool {
    if phrase.len() < MIN_ACCENT_PHRASE_LEN {
        return false;
    }
    let third = phrase.len() / 3;
    let overall = mean(phrase.iter().map(|s| s.pitch));
    let opening = mean(phrase[..third].iter().map(|s| s.pitch));
    let closing = mean(phrase[phrase.len() - third..].iter().map(|s| s.pitch));
    let peak = overall * peak_ratio;
    opening > peak || closing > peak
}

/// Average of 100 per accented phrase and 50 per plain one; `None` without phrases.
pub fn accent_pattern_score(phrases: &[Phrase], peak_ratio: f64) -> Option<f64> {
    if phrases.is_empty() {
        return None;
    }
    Some(mean(phrases.iter().map(|phrase| {
        if has_accent_peak(phrase, peak_ratio) {
            ACCENTED_PHRASE_SCORE
        } else {
            PLAIN_PHRASE_SCORE
        }
    })))
}
