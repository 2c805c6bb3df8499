//! HTTP speech adapters (feature `speech-http`)
//!
//! - [`HttpSpeechSynthesizer`] — MP3 synthesis via a translate-tts style endpoint
//! - [`HttpSpeechTranscriber`] — recognition via a speech-api v2 style endpoint

mod http_synthesizer;
mod http_transcriber;

pub use http_synthesizer::{DEFAULT_SYNTHESIS_URL, HttpSpeechSynthesizer};
pub use http_transcriber::{DEFAULT_TRANSCRIPTION_URL, HttpSpeechTranscriber};

use palaver_domain::BackendError;

/// Map a transport error onto the backend failure taxonomy.
fn convert_request_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::ServiceUnavailable(format!("speech request failed: {}", err))
    }
}

/// Map a non-success HTTP status onto the backend failure taxonomy.
fn convert_status(status: reqwest::StatusCode) -> BackendError {
    let detail = format!(
        "HTTP error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );
    if status.is_client_error() && status != reqwest::StatusCode::TOO_MANY_REQUESTS {
        BackendError::InvalidInput(detail)
    } else {
        BackendError::ServiceUnavailable(detail)
    }
}
