//! Speech synthesizer port

use async_trait::async_trait;
use palaver_domain::BackendError;
use std::time::Duration;

/// Text-to-speech backend
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` spoken in `language` (e.g. `"en"`), returning MP3 bytes.
    async fn synthesize(
        &self,
        text: &str,
        language: &str,
        timeout: Duration,
    ) -> Result<Vec<u8>, BackendError>;
}
