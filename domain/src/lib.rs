//! Domain layer for palaver
//!
//! Entities and value objects of a conversational assistant that routes
//! requests to four generation modalities. No I/O happens here.
//!
//! # Core Concepts
//!
//! ## Session
//!
//! A [`Session`] owns an append-only turn log and a bounded [`MemoryState`].
//! At most one request is in flight per session.
//!
//! ## Memory
//!
//! Memory keeps a running summary plus the most recent turns, and its
//! estimated size never exceeds the [`MemoryBudget`].
//!
//! ## Generation
//!
//! A [`GenerationRequest`] is one of text, image, speech synthesis or speech
//! transcription. Every request resolves to a [`GenerationResult`] of the
//! same kind, carrying either a payload or a [`GenerationFailure`].

pub mod config;
pub mod conversation;
pub mod generation;
pub mod memory;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use conversation::entities::{Role, Turn};
pub use generation::{
    artifact::{ArtifactHandle, ArtifactKey, ArtifactKind},
    config::{ImageGenerationConfig, SpeechSynthesisConfig, TextGenerationConfig},
    failure::{BackendError, GenerationFailure},
    request::{AudioEncoding, GenerationRequest, RequestKind},
    result::GenerationResult,
};
pub use memory::{
    MemoryError,
    budget::MemoryBudget,
    size::{estimate_tokens, estimate_turn, fit_turn, truncate_to_tokens},
    state::MemoryState,
};
pub use prompt::PromptTemplate;
pub use session::entities::{Session, SessionId, SessionStatus, SessionSummary};
