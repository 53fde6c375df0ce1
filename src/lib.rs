pub mod audio;
pub mod config;
pub mod critique;
pub mod intonation;
pub mod types;
