pub mod fusion;
pub mod phrases;
pub mod pitch;
pub mod scorers;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use anyhow::Context as _;
use serde::Serialize;
use tracing::{debug, warn};

use crate::audio::pcm;
use crate::config::IntonationConfig;
use crate::types::PitchSegment;

/// Convenient alias for results returned by intonation modules.
pub type Result<T> = std::result::Result<T, IntonationError>;

/// Lightweight error type for engine construction.
#[derive(Debug, Clone)]
pub struct IntonationError {
    message: Arc<str>,
}

impl IntonationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Arc::from(message.into()),
        }
    }
}

impl Display for IntonationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for IntonationError {}

/// Why a buffer produced no score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscorableReason {
    /// Silence, a buffer shorter than the detector can use, or no voiced window.
    NoPitchDetected,
    /// Segmentation produced no phrase to judge accents on.
    NoPhrases,
    /// An intermediate value went NaN or infinite.
    NonFiniteScore,
}

impl Display for UnscorableReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::NoPitchDetected => "no pitch detected",
            Self::NoPhrases => "no phrases found",
            Self::NonFiniteScore => "score was not finite",
        };
        f.write_str(text)
    }
}

/// Sub-scores and the fused score for one scored utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntonationReport {
    pub phrase_final: f64,
    pub pitch_range: f64,
    pub accent_pattern: f64,
    pub score: u8,
    pub segment_count: usize,
    pub phrase_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Scored(IntonationReport),
    Unscorable(UnscorableReason),
}

impl ScoreOutcome {
    /// The plain 0–100 contract: anything unscorable reads as 0.
    pub fn score(&self) -> u8 {
        match self {
            Self::Scored(report) => report.score,
            Self::Unscorable(_) => 0,
        }
    }

    pub fn report(&self) -> Option<&IntonationReport> {
        match self {
            Self::Scored(report) => Some(report),
            Self::Unscorable(_) => None,
        }
    }
}

/// Scores how strongly an utterance carries the target dialect's melody.
///
/// Holds only its configuration, so one analyzer can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct IntonationAnalyzer {
    config: IntonationConfig,
}

impl IntonationAnalyzer {
    pub fn new(config: IntonationConfig) -> Result<Self> {
        config
            .validate()
            .context("invalid intonation config")
            .map_err(|err| IntonationError::new(format!("{err:#}")))?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IntonationConfig {
        &self.config
    }

    /// Score raw s16le PCM bytes; never fails, unscorable input gives 0.
    pub fn score_pcm_bytes(&self, bytes: &[u8]) -> u8 {
        self.analyze_pcm_bytes(bytes).score()
    }

    pub fn analyze_pcm_bytes(&self, bytes: &[u8]) -> ScoreOutcome {
        let samples = pcm::samples_from_pcm_bytes(bytes, &self.config);
        debug!(
            bytes = bytes.len(),
            samples = samples.len(),
            "decoded pcm buffer"
        );
        self.analyze(&samples)
    }

    pub fn score_samples(&self, samples: &[f32]) -> u8 {
        self.analyze(samples).score()
    }

    pub fn analyze(&self, samples: &[f32]) -> ScoreOutcome {
        let segments = pitch::extract_segments(samples, &self.config);
        self.score_segments(&segments)
    }

    /// Run segmentation, the three scorers and fusion over extracted segments.
    pub fn score_segments(&self, segments: &[PitchSegment]) -> ScoreOutcome {
        if segments.is_empty() {
            warn!("no voiced windows; intonation score is 0");
            return ScoreOutcome::Unscorable(UnscorableReason::NoPitchDetected);
        }

        let config = &self.config;
        let phrases = phrases::split_into_phrases(segments, config.phrase_break_ratio);
        let phrase_final = scorers::phrase_final_score(segments, config.phrase_final_fraction);
        let pitch_range = scorers::pitch_range_score(segments);
        let accent = scorers::accent_pattern_score(&phrases, config.accent_peak_ratio);
        let Some(accent_pattern) = accent else {
            warn!(segments = segments.len(), "segmentation produced no phrases");
            return ScoreOutcome::Unscorable(UnscorableReason::NoPhrases);
        };

        let weights = &config.weights;
        let weighted = weights.combine(phrase_final, pitch_range, accent_pattern);
        debug!(
            phrase_final,
            pitch_range,
            accent_pattern,
            weighted,
            segments = segments.len(),
            phrases = phrases.len(),
            "intonation sub-scores"
        );

        match fusion::acoustic_score(weighted) {
            Some(score) => ScoreOutcome::Scored(IntonationReport {
                phrase_final,
                pitch_range,
                accent_pattern,
                score,
                segment_count: segments.len(),
                phrase_count: phrases.len(),
            }),
            None => {
                warn!(
                    phrase_final,
                    pitch_range, accent_pattern, "non-finite intonation score"
                );
                ScoreOutcome::Unscorable(UnscorableReason::NonFiniteScore)
            }
        }
    }
}
