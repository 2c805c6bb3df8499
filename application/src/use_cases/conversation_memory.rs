//! Conversation memory use case.
//!
//! [`ConversationMemory`] keeps a session's [`MemoryState`] inside its
//! [`MemoryBudget`]. When a new turn pushes the estimate over the budget,
//! the oldest turns are evicted and folded into the running summary through
//! the [`TextGenerator`]'s summarization.
//!
//! # Size guarantee
//!
//! Evicted turns leave at most `max_tokens - summary_reserve_tokens` of
//! recent turns behind. The new summary is cut to whatever room remains, so
//! `size_estimate() <= max_tokens` holds after every update regardless of
//! what the summarizer returns. Repeating the same compaction yields a
//! summary bounded by the same room.
//!
//! # Failure
//!
//! A failed summarization never loses the new turn. The memory keeps the
//! previous summary and the most recent `fallback_recent_turns` turns,
//! trimmed further if needed, and the failure is returned as a warning.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger};
use crate::ports::text_generator::TextGenerator;
use palaver_domain::{
    MemoryBudget, MemoryError, MemoryState, TextGenerationConfig, Turn, fit_turn, truncate_to_tokens,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of [`ConversationMemory::update`].
#[derive(Debug, Clone)]
pub struct MemoryUpdate {
    /// The memory after the update. Always within budget.
    pub state: MemoryState,
    /// Turns folded into the summary (or dropped, on fallback).
    pub evicted_turns: usize,
    /// Set when summarization failed and truncation was used instead.
    pub warning: Option<MemoryError>,
}

pub struct ConversationMemory {
    generator: Arc<dyn TextGenerator>,
    budget: MemoryBudget,
    summary_config: TextGenerationConfig,
    timeout: Duration,
    logger: Arc<dyn ConversationLogger>,
}

impl ConversationMemory {
    /// Create a memory manager over `budget`.
    ///
    /// An invalid budget is replaced by [`MemoryBudget::default`]; the size
    /// guarantee only holds when `summary_reserve_tokens < max_tokens`.
    pub fn new(generator: Arc<dyn TextGenerator>, budget: MemoryBudget) -> Self {
        let issues = budget.validate();
        let budget = if issues.is_empty() {
            budget
        } else {
            warn!("Invalid memory budget ({}); using defaults", issues.join("; "));
            MemoryBudget::default()
        };
        Self {
            generator,
            budget,
            summary_config: TextGenerationConfig::default(),
            timeout: Duration::from_secs(60),
            logger: Arc::new(NoConversationLogger),
        }
    }

    /// Generation settings for summarization calls.
    ///
    /// `max_output_tokens` is overridden per call by the room left in the
    /// budget.
    pub fn with_summary_config(mut self, config: TextGenerationConfig) -> Self {
        self.summary_config = config;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn budget(&self) -> &MemoryBudget {
        &self.budget
    }

    /// Prompt context for the text generator. Deterministic for equal states.
    pub fn context_for_prompt(&self, memory: &MemoryState) -> String {
        memory.context_for_prompt()
    }

    pub fn size_estimate(&self, memory: &MemoryState) -> usize {
        memory.size_estimate()
    }

    /// Append `turn`, compacting when the budget is exceeded.
    pub async fn update(&self, memory: MemoryState, turn: Turn) -> MemoryUpdate {
        let max_tokens = self.budget.max_tokens();
        let mut state = memory;
        state.push_turn(turn);

        if state.size_estimate() <= max_tokens {
            return MemoryUpdate {
                state,
                evicted_turns: 0,
                warning: None,
            };
        }

        let before = state.clone();
        let allowance = self.budget.turn_allowance();
        let mut evicted = Vec::new();
        while state.turn_count() > 1 && (evicted.is_empty() || state.turns_size() > allowance) {
            if let Some(oldest) = state.pop_oldest() {
                evicted.push(oldest);
            }
        }

        // A single oversized turn keeps its place but is shortened in memory.
        if state.turns_size() > allowance
            && let Some(newest) = state.newest()
        {
            let fitted = fit_turn(newest, allowance);
            state.replace_newest(fitted);
        }

        let room = max_tokens.saturating_sub(state.turns_size());

        if evicted.is_empty() {
            let summary = truncate_to_tokens(state.running_summary(), room).to_string();
            state.set_summary(summary);
            return MemoryUpdate {
                state,
                evicted_turns: 0,
                warning: None,
            };
        }

        let new_lines = evicted
            .iter()
            .map(Turn::render)
            .collect::<Vec<_>>()
            .join("\n");
        debug!(
            evicted = evicted.len(),
            room, "Summarizing evicted turns into running summary"
        );

        let outcome = self.summarize(state.running_summary(), &new_lines, room).await;
        match outcome {
            Ok(summary) => {
                state.set_summary(summary);
                self.logger.log(ConversationEvent::new(
                    "memory_compacted",
                    json!({
                        "evicted_turns": evicted.len(),
                        "summary_tokens": state.summary_size(),
                        "memory_tokens": state.size_estimate(),
                    }),
                ));
                MemoryUpdate {
                    state,
                    evicted_turns: evicted.len(),
                    warning: None,
                }
            }
            Err(err) => {
                warn!("{}; falling back to truncation", err);
                self.logger.log(ConversationEvent::new(
                    "memory_summarization_failed",
                    json!({ "reason": err.reason }),
                ));
                let (state, dropped) = self.truncate(before);
                MemoryUpdate {
                    state,
                    evicted_turns: dropped,
                    warning: Some(err),
                }
            }
        }
    }

    async fn summarize(
        &self,
        current_summary: &str,
        new_lines: &str,
        room: usize,
    ) -> Result<String, MemoryError> {
        if room == 0 {
            return Ok(String::new());
        }
        let config = self
            .summary_config
            .clone()
            .with_max_output_tokens(u32::try_from(room).unwrap_or(u32::MAX));

        let call = self
            .generator
            .summarize(current_summary, new_lines, &config, self.timeout);
        let summary = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(summary)) => summary,
            Ok(Err(e)) => return Err(MemoryError::summarization_failed(e.to_string())),
            Err(_) => return Err(MemoryError::summarization_failed("summarization timed out")),
        };

        let summary = truncate_to_tokens(summary.trim(), room);
        if summary.is_empty() {
            return Err(MemoryError::summarization_failed("summarizer returned an empty summary"));
        }
        Ok(summary.to_string())
    }

    /// Fallback without summarization: keep the previous summary and the
    /// most recent turns, dropping (never the newest) until within budget.
    fn truncate(&self, mut state: MemoryState) -> (MemoryState, usize) {
        let max_tokens = self.budget.max_tokens();
        let keep = self.budget.fallback_recent_turns().max(1);
        let mut dropped = 0;

        while state.turn_count() > keep {
            state.pop_oldest();
            dropped += 1;
        }
        while state.turn_count() > 1 && state.size_estimate() > max_tokens {
            state.pop_oldest();
            dropped += 1;
        }
        if state.turns_size() > max_tokens
            && let Some(newest) = state.newest()
        {
            let fitted = fit_turn(newest, max_tokens);
            state.replace_newest(fitted);
        }
        let room = max_tokens.saturating_sub(state.turns_size());
        let summary = truncate_to_tokens(state.running_summary(), room).to_string();
        state.set_summary(summary);

        (state, dropped)
    }
}
