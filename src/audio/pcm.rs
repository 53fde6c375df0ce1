//! Raw PCM handling at the engine boundary.
//!
//! The scorer expects mono signed 16-bit little-endian PCM that the upstream
//! transcoder already produced. A buffer that still starts with the EBML magic
//! of a WebM container is assumed to carry a fixed-size header region, which is
//! skipped wholesale. This is a heuristic guard rather than a container parser:
//! an untranscoded WebM body is still read as PCM and scores as noise.

use tracing::debug;

use crate::config::{IntonationConfig, CONTAINER_MAGIC};

/// Scale used to map `i16` samples onto [-1.0, 1.0).
pub const PCM16_SCALE: f32 = 32768.0;

pub fn has_container_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(&CONTAINER_MAGIC)
}

/// Drop the assumed container header when the magic is present.
pub fn strip_container_header<'a>(bytes: &'a [u8], config: &IntonationConfig) -> &'a [u8] {
    if has_container_magic(bytes) {
        let skip = config.header_skip.min(bytes.len());
        debug!(skip, "container magic detected, skipping header region");
        &bytes[skip..]
    } else {
        bytes
    }
}

/// Interpret bytes as s16le samples; a trailing odd byte is ignored.
pub fn decode_s16le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / PCM16_SCALE)
        .collect()
}

/// Full boundary adaptation: header guard followed by PCM decoding.
pub fn samples_from_pcm_bytes(bytes: &[u8], config: &IntonationConfig) -> Vec<f32> {
    decode_s16le(strip_container_header(bytes, config))
}
