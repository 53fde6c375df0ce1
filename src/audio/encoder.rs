use crate::types::AudioData;
use anyhow::{Context, Result};
use std::path::Path;

/// Write the buffer the scorer analysed as a 16-bit mono WAV, for listening back
/// to what the header adapter and resampler produced.
pub fn encode_audio<P: AsRef<Path>>(audio: &AudioData, path: P) -> Result<()> {
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;
    for &sample in &audio.samples {
        // Inverse of the s16le / 32768 normalisation used on the way in
        let scaled = (sample.clamp(-1.0, 1.0) * 32768.0).clamp(i16::MIN as f32, i16::MAX as f32);
        writer
            .write_sample(scaled as i16)
            .context("Failed to write audio sample")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;

    Ok(())
}
