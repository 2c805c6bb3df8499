//! Audio normalization port
//!
//! Transcription backends expect WAV. Converting uploads to that format is a
//! pre-step owned by the dispatcher, not by the transcriber.

use palaver_domain::AudioEncoding;
use thiserror::Error;

/// Errors from audio normalization
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("audio could not be decoded: {0}")]
    Undecodable(String),

    #[error("audio contains no samples")]
    Empty,

    #[error("audio could not be encoded: {0}")]
    Encode(String),
}

/// Converts uploaded audio into 16-bit PCM WAV.
///
/// Synchronous and CPU-bound; async callers should run it on a blocking
/// thread.
pub trait AudioConverter: Send + Sync {
    fn to_wav(&self, audio: &[u8], encoding: AudioEncoding) -> Result<Vec<u8>, AudioError>;
}

/// Converter that accepts WAV unchanged and rejects everything else.
pub struct PassthroughWavConverter;

impl AudioConverter for PassthroughWavConverter {
    fn to_wav(&self, audio: &[u8], encoding: AudioEncoding) -> Result<Vec<u8>, AudioError> {
        match encoding {
            AudioEncoding::Wav => Ok(audio.to_vec()),
            other => Err(AudioError::Undecodable(format!(
                "no decoder available for {}",
                other
            ))),
        }
    }
}
