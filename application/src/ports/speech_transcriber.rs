//! Speech transcriber port

use async_trait::async_trait;
use palaver_domain::{AudioEncoding, BackendError};
use std::time::Duration;

/// Speech-to-text backend
///
/// Adapters report unrecognizable speech as [`BackendError::Unintelligible`]
/// and transport or service problems with the other tags, so the caller can
/// tell a content failure from an infrastructure one.
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    /// Transcribe `audio`. Callers normalize to WAV first; adapters may
    /// reject other encodings with [`BackendError::InvalidInput`].
    async fn transcribe(
        &self,
        audio: &[u8],
        encoding: AudioEncoding,
        timeout: Duration,
    ) -> Result<String, BackendError>;
}
