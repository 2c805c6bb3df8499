//! Type conversions between the Bedrock SDK and domain types
//!
//! Covers the Titan image request/response bodies and the mapping of SDK
//! errors onto [`BackendError`].

use aws_sdk_bedrockruntime::error::SdkError;
use aws_sdk_bedrockruntime::operation::converse::ConverseError;
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::types as bedrock;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use palaver_domain::{BackendError, ImageGenerationConfig};
use serde::{Deserialize, Serialize};

// ─── Titan image bodies ──────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanImageRequest {
    task_type: &'static str,
    text_to_image_params: TextToImageParams,
    image_generation_config: TitanImageConfig,
}

#[derive(Debug, Serialize)]
struct TextToImageParams {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanImageConfig {
    number_of_images: u32,
    height: u32,
    width: u32,
    cfg_scale: f32,
    seed: u32,
}

impl TitanImageRequest {
    pub fn text_to_image(prompt: &str, config: &ImageGenerationConfig) -> Self {
        Self {
            task_type: "TEXT_IMAGE",
            text_to_image_params: TextToImageParams {
                text: prompt.to_string(),
            },
            image_generation_config: TitanImageConfig {
                number_of_images: config.count,
                height: config.height,
                width: config.width,
                cfg_scale: config.guidance_scale,
                seed: config.seed,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct TitanImageResponse {
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode the base64 `images` array of a Titan response.
///
/// Empty entries are skipped; an empty result is left for the caller to
/// classify.
pub fn decode_titan_images(body: &[u8]) -> Result<Vec<Vec<u8>>, BackendError> {
    let response: TitanImageResponse = serde_json::from_slice(body).map_err(|e| {
        BackendError::ServiceUnavailable(format!("malformed image response: {}", e))
    })?;

    if let Some(error) = response.error.filter(|e| !e.is_empty()) {
        return Err(BackendError::InvalidInput(error));
    }

    let mut images = Vec::with_capacity(response.images.len());
    for encoded in response.images.iter().filter(|s| !s.is_empty()) {
        let bytes = STANDARD.decode(encoded).map_err(|e| {
            BackendError::ServiceUnavailable(format!("invalid base64 image payload: {}", e))
        })?;
        if !bytes.is_empty() {
            images.push(bytes);
        }
    }
    Ok(images)
}

// ─── Converse output ─────────────────────────────────────────────

/// Concatenate the text blocks of a Converse output message.
pub fn converse_output_text(output: &bedrock::ConverseOutput) -> String {
    match output {
        bedrock::ConverseOutput::Message(message) => message
            .content()
            .iter()
            .filter_map(|block| match block {
                bedrock::ContentBlock::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(""),
        _ => String::new(),
    }
}

// ─── Errors ──────────────────────────────────────────────────────

/// Convert a Converse SDK error to a BackendError.
pub fn convert_converse_error(err: &SdkError<ConverseError>) -> BackendError {
    match err {
        SdkError::ServiceError(service_err) => match service_err.err() {
            ConverseError::ThrottlingException(e) => {
                BackendError::ServiceUnavailable(format!("Bedrock throttled: {}", e))
            }
            ConverseError::ModelNotReadyException(e) => {
                BackendError::ServiceUnavailable(format!("Bedrock model not ready: {}", e))
            }
            ConverseError::ValidationException(e) => {
                BackendError::InvalidInput(format!("Bedrock validation error: {}", e))
            }
            ConverseError::ModelTimeoutException(_) => BackendError::Timeout,
            other => BackendError::ServiceUnavailable(format!("Bedrock error: {:?}", other)),
        },
        SdkError::TimeoutError(_) => BackendError::Timeout,
        other => BackendError::ServiceUnavailable(format!("Bedrock SDK error: {}", other)),
    }
}

/// Convert an InvokeModel SDK error to a BackendError.
pub fn convert_invoke_model_error(err: &SdkError<InvokeModelError>) -> BackendError {
    match err {
        SdkError::ServiceError(service_err) => match service_err.err() {
            InvokeModelError::ThrottlingException(e) => {
                BackendError::ServiceUnavailable(format!("Bedrock throttled: {}", e))
            }
            InvokeModelError::ModelNotReadyException(e) => {
                BackendError::ServiceUnavailable(format!("Bedrock model not ready: {}", e))
            }
            InvokeModelError::ValidationException(e) => {
                BackendError::InvalidInput(format!("Bedrock validation error: {}", e))
            }
            InvokeModelError::ModelTimeoutException(_) => BackendError::Timeout,
            other => BackendError::ServiceUnavailable(format!("Bedrock error: {:?}", other)),
        },
        SdkError::TimeoutError(_) => BackendError::Timeout,
        other => BackendError::ServiceUnavailable(format!("Bedrock SDK error: {}", other)),
    }
}
