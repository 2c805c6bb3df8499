//! Bedrock image generator (Titan Image Generator).

use super::types::{self, TitanImageRequest};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_smithy_types::Blob;
use palaver_application::ports::image_generator::ImageGenerator;
use palaver_domain::{BackendError, ImageGenerationConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct BedrockImageGenerator {
    client: Arc<BedrockClient>,
    model_id: String,
}

impl BedrockImageGenerator {
    pub fn new(client: Arc<BedrockClient>, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl ImageGenerator for BedrockImageGenerator {
    async fn generate(
        &self,
        prompt: &str,
        config: &ImageGenerationConfig,
        timeout: Duration,
    ) -> Result<Vec<Vec<u8>>, BackendError> {
        let body = serde_json::to_vec(&TitanImageRequest::text_to_image(prompt, config))
            .map_err(|e| BackendError::InvalidInput(format!("failed to encode request: {}", e)))?;

        debug!(model = %self.model_id, count = config.count, "Calling Bedrock InvokeModel");

        let request = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send();

        let response = tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| BackendError::Timeout)?
            .map_err(|e| types::convert_invoke_model_error(&e))?;

        let images = types::decode_titan_images(response.body().as_ref())?;
        debug!(model = %self.model_id, images = images.len(), "Bedrock returned images");
        Ok(images)
    }
}
