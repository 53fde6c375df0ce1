//! Core types for the intonation scoring pipeline

/// Raw audio data representation (mono, f32 samples)
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Audio samples, normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g., 44100)
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Pitch and loudness estimate for one analysis window that carried a detectable pitch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchSegment {
    /// Fundamental frequency in Hz (always > 0)
    pub pitch: f64,
    /// Root-mean-square amplitude of the window
    pub intensity: f64,
}

impl PitchSegment {
    pub fn new(pitch: f64, intensity: f64) -> Self {
        Self { pitch, intensity }
    }
}

/// A contiguous run of segments bounded by an intensity dip or the end of the utterance
pub type Phrase = Vec<PitchSegment>;
