//! Generation settings from TOML (`[text]`, `[image]`, `[speech]` sections)

use palaver_domain::{ImageGenerationConfig, SpeechSynthesisConfig, TextGenerationConfig};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TEXT_MODEL: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
pub const DEFAULT_IMAGE_MODEL: &str = "amazon.titan-image-generator-v2:0";

/// Text completion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTextConfig {
    /// Backend model identifier.
    pub model_id: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub stop_sequences: Vec<String>,
}

impl Default for FileTextConfig {
    fn default() -> Self {
        let config = TextGenerationConfig::default();
        Self {
            model_id: DEFAULT_TEXT_MODEL.to_string(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            stop_sequences: config.stop_sequences,
        }
    }
}

impl FileTextConfig {
    pub fn to_generation_config(&self) -> TextGenerationConfig {
        TextGenerationConfig {
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
            stop_sequences: self.stop_sequences.clone(),
        }
    }
}

/// Image generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileImageConfig {
    pub model_id: String,
    pub count: u32,
    pub width: u32,
    pub height: u32,
    pub guidance_scale: f32,
    pub seed: u32,
}

impl Default for FileImageConfig {
    fn default() -> Self {
        let config = ImageGenerationConfig::default();
        Self {
            model_id: DEFAULT_IMAGE_MODEL.to_string(),
            count: config.count,
            width: config.width,
            height: config.height,
            guidance_scale: config.guidance_scale,
            seed: config.seed,
        }
    }
}

impl FileImageConfig {
    pub fn to_generation_config(&self) -> ImageGenerationConfig {
        ImageGenerationConfig {
            count: self.count,
            width: self.width,
            height: self.height,
            guidance_scale: self.guidance_scale,
            seed: self.seed,
        }
    }
}

/// Speech synthesis and transcription settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSpeechConfig {
    /// Language of synthesized speech.
    pub language: String,
    /// Synthesis endpoint (default: the public translate-tts endpoint)
    pub synthesis_url: Option<String>,
    /// Recognition endpoint (default: the public speech-api v2 endpoint)
    pub transcription_url: Option<String>,
    /// API key sent with recognition requests.
    pub transcription_key: Option<String>,
    /// Language hint for recognition.
    pub transcription_language: String,
}

impl Default for FileSpeechConfig {
    fn default() -> Self {
        Self {
            language: SpeechSynthesisConfig::default().language,
            synthesis_url: None,
            transcription_url: None,
            transcription_key: None,
            transcription_language: "en-US".to_string(),
        }
    }
}

impl FileSpeechConfig {
    pub fn to_synthesis_config(&self) -> SpeechSynthesisConfig {
        SpeechSynthesisConfig {
            language: self.language.clone(),
        }
    }
}
