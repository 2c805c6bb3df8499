//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into the application's
//! [`PalaverConfig`] once loading is done.

mod dispatch;
mod generation;
mod memory;
mod providers;
mod storage;

pub use dispatch::FileDispatchConfig;
pub use generation::{
    DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, FileImageConfig, FileSpeechConfig, FileTextConfig,
};
pub use memory::FileMemoryConfig;
pub use providers::{FileBedrockConfig, FileProvidersConfig};
pub use storage::{ConfigValidationError, FileStorageConfig, StorageTarget};

use palaver_application::PalaverConfig;
use palaver_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Conversation memory budget
    pub memory: FileMemoryConfig,
    /// Text completion settings
    pub text: FileTextConfig,
    /// Image generation settings
    pub image: FileImageConfig,
    /// Speech synthesis and transcription settings
    pub speech: FileSpeechConfig,
    /// Artifact storage
    pub storage: FileStorageConfig,
    /// Provider credentials and regions
    pub providers: FileProvidersConfig,
    /// Request handling limits
    pub dispatch: FileDispatchConfig,
}

impl FileConfig {
    /// Build the application configuration, returning conversion issues.
    ///
    /// Only the memory section falls back to defaults here; range checks on
    /// the assembled value are done by [`PalaverConfig::validate`].
    pub fn to_palaver_config(&self) -> (PalaverConfig, Vec<ConfigIssue>) {
        let (budget, issues) = self.memory.to_budget();
        let config = PalaverConfig::new(
            budget,
            self.text.to_generation_config(),
            self.image.to_generation_config(),
            self.speech.to_synthesis_config(),
            self.dispatch.to_params(),
        );
        (config, issues)
    }

    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks:
    /// 1. Memory budget consistency (falls back to defaults)
    /// 2. Range checks on the assembled `PalaverConfig`
    /// 3. Storage backend resolution
    /// 4. Backends configured but compiled out of this build
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (config, mut issues) = self.to_palaver_config();
        issues.extend(config.validate());

        match self.storage.target() {
            Ok(StorageTarget::S3 { .. }) if !cfg!(feature = "s3") => {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::BackendUnavailable,
                    "storage: backend \"s3\" requires a build with the `s3` feature",
                ));
            }
            Ok(_) => {}
            Err(e) => issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidStorage,
                format!("storage: {}", e),
            )),
        }

        if !cfg!(feature = "bedrock") {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::BackendUnavailable,
                "text/image: built without the `bedrock` feature; generation requests will fail",
            ));
        }
        if !cfg!(feature = "speech-http") {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::BackendUnavailable,
                "speech: built without the `speech-http` feature; speech requests will fail",
            ));
        }

        issues
    }
}
