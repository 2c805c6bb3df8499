//! Conversation sessions.
//!
//! - [`entities::Session`] — turn log, memory and in-flight status of one conversation
//! - [`entities::SessionSummary`] — listing view of a session

pub mod entities;
