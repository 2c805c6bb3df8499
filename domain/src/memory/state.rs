//! Memory state held by a session.

use super::size::{estimate_tokens, estimate_turn};
use crate::conversation::entities::Turn;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Running summary plus the most recent turns of a conversation.
///
/// Compaction policy lives in the application layer; this type only keeps
/// the pieces in order and measures them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryState {
    running_summary: String,
    recent_turns: VecDeque<Turn>,
}

impl MemoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.running_summary = summary.into();
        self
    }

    pub fn running_summary(&self) -> &str {
        &self.running_summary
    }

    pub fn recent_turns(&self) -> impl ExactSizeIterator<Item = &Turn> {
        self.recent_turns.iter()
    }

    pub fn turn_count(&self) -> usize {
        self.recent_turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running_summary.is_empty() && self.recent_turns.is_empty()
    }

    // ==================== Mutation ====================

    pub fn push_turn(&mut self, turn: Turn) {
        self.recent_turns.push_back(turn);
    }

    pub fn pop_oldest(&mut self) -> Option<Turn> {
        self.recent_turns.pop_front()
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.running_summary = summary.into();
    }

    /// Replace the newest turn in place. No-op on an empty memory.
    pub fn replace_newest(&mut self, turn: Turn) {
        if let Some(last) = self.recent_turns.back_mut() {
            *last = turn;
        }
    }

    pub fn newest(&self) -> Option<&Turn> {
        self.recent_turns.back()
    }

    // ==================== Measurement ====================

    /// Estimated size of the summary alone.
    pub fn summary_size(&self) -> usize {
        estimate_tokens(&self.running_summary)
    }

    /// Estimated size of the recent turns alone.
    pub fn turns_size(&self) -> usize {
        self.recent_turns.iter().map(estimate_turn).sum()
    }

    /// Combined estimate compared against the budget.
    pub fn size_estimate(&self) -> usize {
        self.summary_size() + self.turns_size()
    }

    /// Prompt context: the summary as a `System:` line, then each turn in
    /// chronological order, one per line.
    ///
    /// # Examples
    ///
    /// ```
    /// use palaver_domain::conversation::entities::Turn;
    /// use palaver_domain::memory::state::MemoryState;
    ///
    /// let mut memory = MemoryState::new().with_summary("The user greeted the AI.");
    /// memory.push_turn(Turn::user("How are you?"));
    /// memory.push_turn(Turn::assistant("Fine, thanks."));
    ///
    /// assert_eq!(
    ///     memory.context_for_prompt(),
    ///     "System: The user greeted the AI.\nHuman: How are you?\nAI: Fine, thanks."
    /// );
    /// ```
    pub fn context_for_prompt(&self) -> String {
        let mut lines = Vec::with_capacity(self.recent_turns.len() + 1);
        if !self.running_summary.is_empty() {
            lines.push(format!("System: {}", self.running_summary));
        }
        lines.extend(self.recent_turns.iter().map(Turn::render));
        lines.join("\n")
    }
}
