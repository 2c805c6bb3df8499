//! Bedrock text generator
//!
//! Wraps the Converse API. The API is stateless, so each call sends a single
//! user message holding the fully rendered prompt.

use super::types;
use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_sdk_bedrockruntime::types as bedrock;
use palaver_application::ports::text_generator::TextGenerator;
use palaver_domain::{BackendError, PromptTemplate, TextGenerationConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub struct BedrockTextGenerator {
    client: Arc<BedrockClient>,
    model_id: String,
}

impl BedrockTextGenerator {
    pub fn new(client: Arc<BedrockClient>, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn converse(
        &self,
        prompt: String,
        config: &TextGenerationConfig,
        timeout: Duration,
    ) -> Result<String, BackendError> {
        let message = bedrock::Message::builder()
            .role(bedrock::ConversationRole::User)
            .content(bedrock::ContentBlock::Text(prompt))
            .build()
            .map_err(|e| BackendError::InvalidInput(format!("failed to build message: {}", e)))?;

        let inference = bedrock::InferenceConfiguration::builder()
            .max_tokens(config.max_output_tokens.min(i32::MAX as u32) as i32)
            .temperature(config.temperature)
            .top_p(config.top_p)
            .set_stop_sequences(Some(config.stop_sequences.clone()))
            .build();

        debug!(model = %self.model_id, "Calling Bedrock Converse API");

        let request = self
            .client
            .converse()
            .model_id(&self.model_id)
            .messages(message)
            .inference_config(inference)
            .send();

        let response = tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| BackendError::Timeout)?
            .map_err(|e| types::convert_converse_error(&e))?;

        let text = response
            .output()
            .map(types::converse_output_text)
            .unwrap_or_default();

        debug!(
            model = %self.model_id,
            stop_reason = ?response.stop_reason(),
            chars = text.len(),
            "Bedrock Converse API returned"
        );
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for BedrockTextGenerator {
    async fn complete(
        &self,
        context: &str,
        input: &str,
        config: &TextGenerationConfig,
        timeout: Duration,
    ) -> Result<String, BackendError> {
        let prompt = PromptTemplate::conversation(context, input);
        self.converse(prompt, config, timeout).await
    }

    async fn summarize(
        &self,
        current_summary: &str,
        new_lines: &str,
        config: &TextGenerationConfig,
        timeout: Duration,
    ) -> Result<String, BackendError> {
        let prompt = PromptTemplate::progressive_summary(current_summary, new_lines);
        self.converse(prompt, config, timeout).await
    }
}
