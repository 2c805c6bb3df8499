//! AWS Bedrock adapters
//!
//! Text completion goes through the Converse API; image generation uses
//! `InvokeModel` with a Titan Image Generator request body. Both share one
//! runtime client per process.

mod image;
mod text;
mod types;

pub use image::BedrockImageGenerator;
pub use text::BedrockTextGenerator;

use crate::providers::aws::{AwsSettings, load_sdk_config};
use aws_sdk_bedrockruntime::Client as BedrockClient;
use std::sync::Arc;
use tracing::info;

/// Build a Bedrock Runtime client for `settings`.
pub async fn connect(settings: &AwsSettings) -> Arc<BedrockClient> {
    let sdk_config = load_sdk_config(settings).await;
    info!(region = %settings.region, "Bedrock runtime client initialized");
    Arc::new(BedrockClient::new(&sdk_config))
}
