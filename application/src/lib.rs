//! Application layer for palaver
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DispatchParams, PalaverConfig};
pub use ports::{
    artifact_store::{ArtifactStore, StoreError},
    audio_converter::{AudioConverter, AudioError, PassthroughWavConverter},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    image_generator::ImageGenerator,
    progress::{NoProgress, ProgressNotifier},
    speech_synthesizer::SpeechSynthesizer,
    speech_transcriber::SpeechTranscriber,
    text_generator::TextGenerator,
};
pub use use_cases::conversation_memory::{ConversationMemory, MemoryUpdate};
pub use use_cases::dispatch::{Backends, RequestDispatcher, SharedSession, lock_session};
pub use use_cases::session_registry::SessionRegistry;
