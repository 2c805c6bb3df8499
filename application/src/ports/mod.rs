//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.
//! Adapters are stateless with respect to sessions and are shared across
//! all of them.

pub mod artifact_store;
pub mod audio_converter;
pub mod conversation_logger;
pub mod image_generator;
pub mod progress;
pub mod speech_synthesizer;
pub mod speech_transcriber;
pub mod text_generator;
