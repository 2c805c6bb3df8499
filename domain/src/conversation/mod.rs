//! Conversation domain.
//!
//! - [`entities::Turn`] — one immutable user or assistant utterance
//! - [`entities::Role`] — who spoke a turn

pub mod entities;
