//! Audio normalization
//!
//! Decodes uploads with symphonia and re-encodes them with hound as the
//! canonical transcription input: 16 kHz mono 16-bit PCM WAV.

mod converter;

pub use converter::{CANONICAL_SAMPLE_RATE, SymphoniaWavConverter};
