use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

/// Sample rate the acoustic scoring path expects its PCM at.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
/// Non-overlapping analysis window length in samples.
pub const DEFAULT_WINDOW_SIZE: usize = 2048;
/// A segment quieter than this fraction of the mean intensity closes its phrase.
pub const DEFAULT_PHRASE_BREAK_RATIO: f64 = 0.7;
/// The start or end of a phrase counts as accented above this multiple of the phrase mean pitch.
pub const DEFAULT_ACCENT_PEAK_RATIO: f64 = 1.1;
/// Share of the segment sequence (from the end) examined for the phrase-final contour.
pub const DEFAULT_PHRASE_FINAL_FRACTION: f64 = 0.2;
/// YIN absolute threshold on the cumulative mean normalized difference.
pub const DEFAULT_YIN_THRESHOLD: f32 = 0.1;
/// EBML magic marking an untranscoded WebM/Matroska container.
pub const CONTAINER_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];
/// Bytes skipped when the container magic is present.
pub const DEFAULT_HEADER_SKIP: usize = 4000;

/// Weights applied to the three sub-scores before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub phrase_final: f64,
    pub pitch_range: f64,
    pub accent_pattern: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            phrase_final: 0.4,
            pitch_range: 0.3,
            accent_pattern: 0.3,
        }
    }
}

/// Tunable thresholds for the intonation engine.
///
/// Every field has a default matching the reference scoring behaviour, so a
/// JSON override only needs to name the fields it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IntonationConfig {
    pub sample_rate: u32,
    pub window_size: usize,
    pub yin_threshold: f32,
    pub phrase_break_ratio: f64,
    pub accent_peak_ratio: f64,
    pub phrase_final_fraction: f64,
    pub weights: FusionWeights,
    pub header_skip: usize,
}

impl Default for IntonationConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            window_size: DEFAULT_WINDOW_SIZE,
            yin_threshold: DEFAULT_YIN_THRESHOLD,
            phrase_break_ratio: DEFAULT_PHRASE_BREAK_RATIO,
            accent_peak_ratio: DEFAULT_ACCENT_PEAK_RATIO,
            phrase_final_fraction: DEFAULT_PHRASE_FINAL_FRACTION,
            weights: FusionWeights::default(),
            header_skip: DEFAULT_HEADER_SKIP,
        }
    }
}

impl IntonationConfig {
    /// Load overrides from a JSON file, falling back to defaults for absent fields.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read intonation config at {:?}", path))?;
        let config = Self::from_json(&raw)
            .with_context(|| format!("invalid intonation config in {:?}", path))?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_override(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(custom) => Self::load(custom),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.sample_rate > 0, "sample_rate must be positive");
        ensure!(self.window_size > 0, "window_size must be positive");
        ensure!(
            self.yin_threshold > 0.0 && self.yin_threshold < 1.0,
            "yin_threshold must lie in (0, 1), got {}",
            self.yin_threshold
        );
        ensure!(
            self.phrase_break_ratio > 0.0,
            "phrase_break_ratio must be positive"
        );
        ensure!(
            self.accent_peak_ratio > 0.0,
            "accent_peak_ratio must be positive"
        );
        ensure!(
            self.phrase_final_fraction > 0.0 && self.phrase_final_fraction <= 1.0,
            "phrase_final_fraction must lie in (0, 1], got {}",
            self.phrase_final_fraction
        );
        let w = &self.weights;
        ensure!(
            [w.phrase_final, w.pitch_range, w.accent_pattern]
                .iter()
                .all(|weight| weight.is_finite() && *weight >= 0.0),
            "fusion weights must be finite and non-negative"
        );
        Ok(())
    }
}
