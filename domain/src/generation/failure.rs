//! Failure taxonomy for generation requests

use thiserror::Error;

/// Failure tag returned by a backend adapter.
///
/// Adapters never retry; they report what happened and let the caller
/// decide.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend call timed out")]
    Timeout,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("backend returned no usable output")]
    EmptyOutput,

    /// The backend received the audio but could not recognise any speech.
    #[error("audio could not be understood: {0}")]
    Unintelligible(String),
}

impl BackendError {
    /// Whether the same call could succeed if repeated later.
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Timeout | BackendError::ServiceUnavailable(_))
    }
}

/// Structured failure carried by a [`GenerationResult`](super::result::GenerationResult).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    /// Malformed or empty request, rejected before any backend call.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Another request is already in flight for this session.
    #[error("session is busy with another request")]
    SessionBusy,

    /// The backend call failed; the inner tag says how.
    #[error("generation failed: {0}")]
    GenerationFailed(BackendError),

    /// The backend answered but produced nothing usable.
    #[error("no output produced")]
    NoOutputProduced,

    /// Content-level transcription failure; retrying the same audio won't help.
    #[error("audio unintelligible: {0}")]
    AudioUnintelligible(String),

    /// The transcription backend was unreachable or rejected the request.
    #[error("transcription service error: {0}")]
    TranscriptionServiceError(String),

    /// Generated output could not be persisted.
    #[error("storage failed: {0}")]
    StorageFailed(String),
}

impl GenerationFailure {
    /// Whether the caller may reasonably retry the request.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationFailure::SessionBusy
            | GenerationFailure::TranscriptionServiceError(_)
            | GenerationFailure::StorageFailed(_) => true,
            GenerationFailure::GenerationFailed(err) => err.is_transient(),
            GenerationFailure::InvalidInput(_)
            | GenerationFailure::NoOutputProduced
            | GenerationFailure::AudioUnintelligible(_) => false,
        }
    }

    /// Short machine-friendly name, used in structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            GenerationFailure::InvalidInput(_) => "invalid_input",
            GenerationFailure::SessionBusy => "session_busy",
            GenerationFailure::GenerationFailed(BackendError::Timeout) => "timeout",
            GenerationFailure::GenerationFailed(BackendError::ServiceUnavailable(_)) => {
                "service_unavailable"
            }
            GenerationFailure::GenerationFailed(_) => "generation_failed",
            GenerationFailure::NoOutputProduced => "no_output_produced",
            GenerationFailure::AudioUnintelligible(_) => "audio_unintelligible",
            GenerationFailure::TranscriptionServiceError(_) => "transcription_service_error",
            GenerationFailure::StorageFailed(_) => "storage_failed",
        }
    }
}
