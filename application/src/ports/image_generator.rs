//! Image generator port

use async_trait::async_trait;
use palaver_domain::{BackendError, ImageGenerationConfig};
use std::time::Duration;

/// Text-to-image backend
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate images for `prompt`, returning raw encoded image payloads.
    ///
    /// An empty list is a valid answer; the caller decides what it means.
    async fn generate(
        &self,
        prompt: &str,
        config: &ImageGenerationConfig,
        timeout: Duration,
    ) -> Result<Vec<Vec<u8>>, BackendError>;
}
