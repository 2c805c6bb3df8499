//! Text generator port
//!
//! Defines the interface for text completion and the summarization used by
//! memory compaction.

use async_trait::async_trait;
use palaver_domain::{BackendError, TextGenerationConfig};
use std::time::Duration;

/// Text completion backend
///
/// Implementations render the prompt themselves (see
/// [`PromptTemplate`](palaver_domain::PromptTemplate)) and make exactly one
/// backend call per method. They never retry.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete the conversation given the memory context and the new input.
    async fn complete(
        &self,
        context: &str,
        input: &str,
        config: &TextGenerationConfig,
        timeout: Duration,
    ) -> Result<String, BackendError>;

    /// Fold `new_lines` into `current_summary`, producing a new summary of at
    /// most `config.max_output_tokens` tokens.
    async fn summarize(
        &self,
        current_summary: &str,
        new_lines: &str,
        config: &TextGenerationConfig,
        timeout: Duration,
    ) -> Result<String, BackendError>;
}
