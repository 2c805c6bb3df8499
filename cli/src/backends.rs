//! Backend assembly
//!
//! Picks an adapter for every port from the file configuration and the
//! features this binary was built with. Anything compiled out is replaced
//! by an [`UnavailableBackend`].

use anyhow::{Result, anyhow};
use palaver_application::{
    ArtifactStore, Backends, ImageGenerator, SpeechSynthesizer, SpeechTranscriber, TextGenerator,
};
use palaver_infrastructure::{
    FileConfig, FilesystemArtifactStore, StorageTarget, SymphoniaWavConverter, UnavailableBackend,
};
use std::sync::Arc;
use tracing::{info, warn};

#[cfg(any(feature = "bedrock", feature = "s3"))]
fn aws_settings(config: &FileConfig) -> palaver_infrastructure::AwsSettings {
    palaver_infrastructure::AwsSettings {
        region: config.providers.bedrock.region.clone(),
        profile: config.providers.bedrock.profile.clone(),
    }
}

#[cfg(feature = "bedrock")]
async fn generators(config: &FileConfig) -> (Arc<dyn TextGenerator>, Arc<dyn ImageGenerator>) {
    use palaver_infrastructure::providers::bedrock;
    use palaver_infrastructure::{BedrockImageGenerator, BedrockTextGenerator};

    let client = bedrock::connect(&aws_settings(config)).await;
    info!(
        text_model = %config.text.model_id,
        image_model = %config.image.model_id,
        "Using Bedrock for text and image generation"
    );
    (
        Arc::new(BedrockTextGenerator::new(
            client.clone(),
            config.text.model_id.clone(),
        )),
        Arc::new(BedrockImageGenerator::new(
            client,
            config.image.model_id.clone(),
        )),
    )
}

#[cfg(not(feature = "bedrock"))]
async fn generators(_config: &FileConfig) -> (Arc<dyn TextGenerator>, Arc<dyn ImageGenerator>) {
    warn!("Built without the `bedrock` feature; text and image requests will fail");
    let backend = Arc::new(UnavailableBackend::new(
        "text and image generation are not available in this build",
    ));
    (backend.clone(), backend)
}

#[cfg(feature = "speech-http")]
fn speech(config: &FileConfig) -> (Arc<dyn SpeechSynthesizer>, Arc<dyn SpeechTranscriber>) {
    use palaver_infrastructure::speech::{DEFAULT_SYNTHESIS_URL, DEFAULT_TRANSCRIPTION_URL};
    use palaver_infrastructure::{HttpSpeechSynthesizer, HttpSpeechTranscriber};

    let speech = &config.speech;
    let synthesizer = HttpSpeechSynthesizer::new(
        speech
            .synthesis_url
            .as_deref()
            .unwrap_or(DEFAULT_SYNTHESIS_URL),
    );
    let mut transcriber = HttpSpeechTranscriber::new(
        speech
            .transcription_url
            .as_deref()
            .unwrap_or(DEFAULT_TRANSCRIPTION_URL),
        speech.transcription_language.clone(),
    );
    if let Some(ref key) = speech.transcription_key {
        transcriber = transcriber.with_key(key.clone());
    }
    (Arc::new(synthesizer), Arc::new(transcriber))
}

#[cfg(not(feature = "speech-http"))]
fn speech(_config: &FileConfig) -> (Arc<dyn SpeechSynthesizer>, Arc<dyn SpeechTranscriber>) {
    warn!("Built without the `speech-http` feature; speech requests will fail");
    let backend = Arc::new(UnavailableBackend::new(
        "speech synthesis and transcription are not available in this build",
    ));
    (backend.clone(), backend)
}

async fn store(config: &FileConfig) -> Result<Arc<dyn ArtifactStore>> {
    let target = config
        .storage
        .target()
        .map_err(|e| anyhow!("invalid [storage] section: {}", e))?;
    match target {
        StorageTarget::Filesystem(root) => {
            info!(root = %root.display(), "Storing artifacts on the filesystem");
            Ok(Arc::new(FilesystemArtifactStore::new(root)))
        }
        #[cfg(feature = "s3")]
        StorageTarget::S3 { bucket } => Ok(Arc::new(
            palaver_infrastructure::S3ArtifactStore::new(&aws_settings(config), bucket).await,
        )),
        #[cfg(not(feature = "s3"))]
        StorageTarget::S3 { bucket } => {
            warn!(bucket = %bucket, "Built without the `s3` feature; artifacts cannot be stored");
            Ok(Arc::new(UnavailableBackend::new(
                "S3 storage is not available in this build",
            )))
        }
    }
}

/// Build every backend the dispatcher needs.
pub async fn assemble(config: &FileConfig) -> Result<Backends> {
    let (text, image) = generators(config).await;
    let (synthesizer, transcriber) = speech(config);
    let store = store(config).await?;
    Ok(Backends::new(text, image, synthesizer, transcriber, store)
        .with_converter(Arc::new(SymphoniaWavConverter::new())))
}
