//! Generation results

use super::artifact::ArtifactHandle;
use super::failure::GenerationFailure;
use super::request::RequestKind;

/// Outcome of a request, tagged by the request's modality.
///
/// Every variant holds either the success payload or a structured
/// [`GenerationFailure`]; a dispatcher never returns anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    Text(Result<String, GenerationFailure>),
    Image(Result<Vec<ArtifactHandle>, GenerationFailure>),
    SpeechSynthesis(Result<ArtifactHandle, GenerationFailure>),
    SpeechTranscription(Result<String, GenerationFailure>),
}

impl GenerationResult {
    /// Build a failed result of the given kind.
    pub fn failed(kind: RequestKind, failure: GenerationFailure) -> Self {
        match kind {
            RequestKind::Text => GenerationResult::Text(Err(failure)),
            RequestKind::Image => GenerationResult::Image(Err(failure)),
            RequestKind::SpeechSynthesis => GenerationResult::SpeechSynthesis(Err(failure)),
            RequestKind::SpeechTranscription => {
                GenerationResult::SpeechTranscription(Err(failure))
            }
        }
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            GenerationResult::Text(_) => RequestKind::Text,
            GenerationResult::Image(_) => RequestKind::Image,
            GenerationResult::SpeechSynthesis(_) => RequestKind::SpeechSynthesis,
            GenerationResult::SpeechTranscription(_) => RequestKind::SpeechTranscription,
        }
    }

    pub fn failure(&self) -> Option<&GenerationFailure> {
        match self {
            GenerationResult::Text(r) | GenerationResult::SpeechTranscription(r) => {
                r.as_ref().err()
            }
            GenerationResult::Image(r) => r.as_ref().err(),
            GenerationResult::SpeechSynthesis(r) => r.as_ref().err(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure().is_none()
    }

    /// Text payload for `Text` and `SpeechTranscription` successes.
    pub fn text(&self) -> Option<&str> {
        match self {
            GenerationResult::Text(Ok(text)) | GenerationResult::SpeechTranscription(Ok(text)) => {
                Some(text)
            }
            _ => None,
        }
    }

    /// Artifact handles for `Image` and `SpeechSynthesis` successes.
    pub fn artifacts(&self) -> Vec<ArtifactHandle> {
        match self {
            GenerationResult::Image(Ok(handles)) => handles.clone(),
            GenerationResult::SpeechSynthesis(Ok(handle)) => vec![handle.clone()],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_mirrors_kind() {
        for kind in [
            RequestKind::Text,
            RequestKind::Image,
            RequestKind::SpeechSynthesis,
            RequestKind::SpeechTranscription,
        ] {
            let result = GenerationResult::failed(kind, GenerationFailure::SessionBusy);
            assert_eq!(result.kind(), kind);
            assert_eq!(result.failure(), Some(&GenerationFailure::SessionBusy));
            assert!(!result.is_success());
        }
    }

    #[test]
    fn test_text_accessor() {
        let result = GenerationResult::SpeechTranscription(Ok("hello".to_string()));
        assert_eq!(result.text(), Some("hello"));
        assert!(result.artifacts().is_empty());
    }
}
