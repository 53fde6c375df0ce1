use crate::types::{Phrase, PitchSegment};

pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in values {
        sum += value;
        count += 1;
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Partition segments into phrases at intensity dips.
///
/// A segment quieter than `break_ratio` times the mean intensity of the whole
/// sequence closes the phrase it belongs to; the last segment always closes the
/// final phrase. Phrases are never empty and their concatenation is the input.
pub fn split_into_phrases(segments: &[PitchSegment], break_ratio: f64) -> Vec<Phrase> {
    if segments.is_empty() {
        return Vec::new();
    }
    let threshold = mean(segments.iter().map(|s| s.intensity)) * break_ratio;

    let mut phrases = Vec::new();
    let mut current = Phrase::new();
    for (idx, segment) in segments.iter().enumerate() {
        current.push(*segment);
        let is_last = idx + 1 == segments.len();
        if segment.intensity < threshold || is_last {
            phrases.push(std::mem::take(&mut current));
        }
    }
    phrases
}
