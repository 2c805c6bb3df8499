//! Per-modality generation settings.
//!
//! Defaults match the settings the assistant ships with: a short,
//! low-temperature completion budget and a single 1024x1024 image.

use serde::{Deserialize, Serialize};

/// Settings for a text completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextGenerationConfig {
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stop_sequences: Vec<String>,
}

impl Default for TextGenerationConfig {
    fn default() -> Self {
        Self {
            max_output_tokens: 300,
            temperature: 0.1,
            top_p: 0.9,
            stop_sequences: vec!["\n\nHuman:".to_string()],
        }
    }
}

impl TextGenerationConfig {
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }
}

/// Settings for an image synthesis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerationConfig {
    pub count: u32,
    pub width: u32,
    pub height: u32,
    pub guidance_scale: f32,
    pub seed: u32,
}

impl Default for ImageGenerationConfig {
    fn default() -> Self {
        Self {
            count: 1,
            width: 1024,
            height: 1024,
            guidance_scale: 8.0,
            seed: 0,
        }
    }
}

/// Settings for speech synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechSynthesisConfig {
    /// Language code passed to the synthesizer (e.g. "en").
    pub language: String,
}

impl Default for SpeechSynthesisConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
        }
    }
}
