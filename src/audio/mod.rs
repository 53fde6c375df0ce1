pub mod decoder;
pub mod encoder;
pub mod pcm;
pub mod resample;
