//! Bounded conversation memory.
//!
//! - [`state::MemoryState`] — running summary plus the most recent turns
//! - [`budget::MemoryBudget`] — size bound and compaction knobs
//! - [`size`] — the token estimate every budget check is measured with

pub mod budget;
pub mod size;
pub mod state;

use thiserror::Error;

/// Summarization of evicted turns failed.
///
/// Never surfaced to callers as a hard failure; the memory falls back to
/// truncation and reports this as a warning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("memory summarization failed: {reason}")]
pub struct MemoryError {
    pub reason: String,
}

impl MemoryError {
    pub fn summarization_failed(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
