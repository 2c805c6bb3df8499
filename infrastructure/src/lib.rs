//! Infrastructure layer for palaver
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod audio;
pub mod config;
pub mod logging;
pub mod providers;
#[cfg(feature = "speech-http")]
pub mod speech;
pub mod storage;

// Re-export commonly used types
pub use audio::SymphoniaWavConverter;
pub use config::{ConfigLoader, ConfigValidationError, FileConfig, StorageTarget};
pub use logging::JsonlConversationLogger;
pub use providers::UnavailableBackend;
#[cfg(any(feature = "bedrock", feature = "s3"))]
pub use providers::aws::AwsSettings;
#[cfg(feature = "bedrock")]
pub use providers::bedrock::{BedrockImageGenerator, BedrockTextGenerator};
#[cfg(feature = "speech-http")]
pub use speech::{HttpSpeechSynthesizer, HttpSpeechTranscriber};
#[cfg(feature = "s3")]
pub use storage::S3ArtifactStore;
pub use storage::FilesystemArtifactStore;
