//! Generation requests

use super::failure::GenerationFailure;
use serde::{Deserialize, Serialize};

/// Encoding of uploaded audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioEncoding {
    Wav,
    Mp3,
}

impl AudioEncoding {
    /// Guess the encoding from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "wav" | "wave" => Some(AudioEncoding::Wav),
            "mp3" => Some(AudioEncoding::Mp3),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Wav => "wav",
            AudioEncoding::Mp3 => "mp3",
        }
    }
}

impl std::fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which modality a request (or result) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Text,
    Image,
    SpeechSynthesis,
    SpeechTranscription,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Text => "text",
            RequestKind::Image => "image",
            RequestKind::SpeechSynthesis => "speech_synthesis",
            RequestKind::SpeechTranscription => "speech_transcription",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed request for one of the four modalities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Text { input: String },
    Image { prompt: String },
    SpeechSynthesis { text: String },
    SpeechTranscription { audio: Vec<u8>, encoding: AudioEncoding },
}

impl GenerationRequest {
    pub fn text(input: impl Into<String>) -> Self {
        GenerationRequest::Text {
            input: input.into(),
        }
    }

    pub fn image(prompt: impl Into<String>) -> Self {
        GenerationRequest::Image {
            prompt: prompt.into(),
        }
    }

    pub fn speech(text: impl Into<String>) -> Self {
        GenerationRequest::SpeechSynthesis { text: text.into() }
    }

    pub fn transcription(audio: Vec<u8>, encoding: AudioEncoding) -> Self {
        GenerationRequest::SpeechTranscription { audio, encoding }
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            GenerationRequest::Text { .. } => RequestKind::Text,
            GenerationRequest::Image { .. } => RequestKind::Image,
            GenerationRequest::SpeechSynthesis { .. } => RequestKind::SpeechSynthesis,
            GenerationRequest::SpeechTranscription { .. } => RequestKind::SpeechTranscription,
        }
    }

    /// Reject empty or oversized input before any backend is touched.
    ///
    /// `max_input_chars` bounds the textual fields; audio only has to be
    /// non-empty here, decoding problems surface later.
    pub fn validate(&self, max_input_chars: usize) -> Result<(), GenerationFailure> {
        let (field, value) = match self {
            GenerationRequest::Text { input } => ("input", input),
            GenerationRequest::Image { prompt } => ("prompt", prompt),
            GenerationRequest::SpeechSynthesis { text } => ("text", text),
            GenerationRequest::SpeechTranscription { audio, .. } => {
                if audio.is_empty() {
                    return Err(GenerationFailure::InvalidInput(
                        "audio payload is empty".to_string(),
                    ));
                }
                return Ok(());
            }
        };

        if value.trim().is_empty() {
            return Err(GenerationFailure::InvalidInput(format!(
                "{} cannot be empty",
                field
            )));
        }
        let chars = value.chars().count();
        if chars > max_input_chars {
            return Err(GenerationFailure::InvalidInput(format!(
                "{} exceeds maximum length of {} characters ({} given)",
                field, max_input_chars, chars
            )));
        }
        Ok(())
    }

    /// One-line description of the request for the turn log.
    pub fn describe(&self) -> String {
        match self {
            GenerationRequest::Text { input } => input.clone(),
            GenerationRequest::Image { prompt } => format!("[image] {}", prompt),
            GenerationRequest::SpeechSynthesis { text } => format!("[speak] {}", text),
            GenerationRequest::SpeechTranscription { audio, encoding } => {
                format!("[transcribe] {} audio, {} bytes", encoding, audio.len())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(GenerationRequest::text("hi").kind(), RequestKind::Text);
        assert_eq!(
            GenerationRequest::transcription(vec![1], AudioEncoding::Wav).kind(),
            RequestKind::SpeechTranscription
        );
    }

    #[test]
    fn test_validate_rejects_whitespace() {
        let err = GenerationRequest::image("   ").validate(100).unwrap_err();
        assert_eq!(
            err,
            GenerationFailure::InvalidInput("prompt cannot be empty".to_string())
        );
    }

    #[test]
    fn test_validate_counts_chars_not_bytes() {
        // 5 chars, 15 bytes
        let req = GenerationRequest::text("あいうえお");
        assert!(req.validate(5).is_ok());
        assert!(req.validate(4).is_err());
    }

    #[test]
    fn test_validate_empty_audio() {
        let req = GenerationRequest::transcription(vec![], AudioEncoding::Mp3);
        assert!(matches!(
            req.validate(10),
            Err(GenerationFailure::InvalidInput(_))
        ));
    }

    #[test]
    fn test_encoding_from_extension() {
        assert_eq!(AudioEncoding::from_extension("WAV"), Some(AudioEncoding::Wav));
        assert_eq!(AudioEncoding::from_extension("mp3"), Some(AudioEncoding::Mp3));
        assert_eq!(AudioEncoding::from_extension("ogg"), None);
    }

    #[test]
    fn test_describe_transcription() {
        let req = GenerationRequest::transcription(vec![0; 42], AudioEncoding::Mp3);
        assert_eq!(req.describe(), "[transcribe] mp3 audio, 42 bytes");
    }
}
