//! Placeholder backend for modalities with no adapter wired in.

use async_trait::async_trait;
use palaver_application::ports::{
    artifact_store::{ArtifactStore, StoreError},
    image_generator::ImageGenerator,
    speech_synthesizer::SpeechSynthesizer,
    speech_transcriber::SpeechTranscriber,
    text_generator::TextGenerator,
};
use palaver_domain::{
    ArtifactHandle, ArtifactKey, AudioEncoding, BackendError, ImageGenerationConfig,
    TextGenerationConfig,
};
use std::time::Duration;

/// Answers every call with `ServiceUnavailable`.
///
/// Lets the dispatcher return well-formed failures for a modality whose
/// backend was compiled out or left unconfigured.
#[derive(Debug, Clone)]
pub struct UnavailableBackend {
    reason: String,
}

impl UnavailableBackend {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    fn error(&self) -> BackendError {
        BackendError::ServiceUnavailable(self.reason.clone())
    }
}

#[async_trait]
impl TextGenerator for UnavailableBackend {
    async fn complete(
        &self,
        _context: &str,
        _input: &str,
        _config: &TextGenerationConfig,
        _timeout: Duration,
    ) -> Result<String, BackendError> {
        Err(self.error())
    }

    async fn summarize(
        &self,
        _current_summary: &str,
        _new_lines: &str,
        _config: &TextGenerationConfig,
        _timeout: Duration,
    ) -> Result<String, BackendError> {
        Err(self.error())
    }
}

#[async_trait]
impl ImageGenerator for UnavailableBackend {
    async fn generate(
        &self,
        _prompt: &str,
        _config: &ImageGenerationConfig,
        _timeout: Duration,
    ) -> Result<Vec<Vec<u8>>, BackendError> {
        Err(self.error())
    }
}

#[async_trait]
impl SpeechSynthesizer for UnavailableBackend {
    async fn synthesize(
        &self,
        _text: &str,
        _language: &str,
        _timeout: Duration,
    ) -> Result<Vec<u8>, BackendError> {
        Err(self.error())
    }
}

#[async_trait]
impl SpeechTranscriber for UnavailableBackend {
    async fn transcribe(
        &self,
        _audio: &[u8],
        _encoding: AudioEncoding,
        _timeout: Duration,
    ) -> Result<String, BackendError> {
        Err(self.error())
    }
}

#[async_trait]
impl ArtifactStore for UnavailableBackend {
    async fn put(
        &self,
        _key: &ArtifactKey,
        _payload: &[u8],
        _content_type: &str,
    ) -> Result<ArtifactHandle, StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}
