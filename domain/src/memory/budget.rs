//! Memory budget.
//!
//! [`MemoryBudget`] bounds the estimated size of a [`MemoryState`] and
//! controls how compaction makes room.
//!
//! [`MemoryState`]: super::state::MemoryState

use serde::{Deserialize, Serialize};

/// Budget for a session's memory.
///
/// Three knobs:
/// - `max_tokens`: upper bound on summary + recent turns after every update
/// - `summary_reserve_tokens`: room kept free for the running summary when
///   turns are evicted
/// - `fallback_recent_turns`: how many turns survive when summarization fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBudget {
    max_tokens: usize,
    summary_reserve_tokens: usize,
    fallback_recent_turns: usize,
}

impl MemoryBudget {
    pub fn new(max_tokens: usize, summary_reserve_tokens: usize, fallback_recent_turns: usize) -> Self {
        Self {
            max_tokens,
            summary_reserve_tokens,
            fallback_recent_turns,
        }
    }

    // ==================== Accessors ====================

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn summary_reserve_tokens(&self) -> usize {
        self.summary_reserve_tokens
    }

    pub fn fallback_recent_turns(&self) -> usize {
        self.fallback_recent_turns
    }

    /// Largest size the recent turns may keep once compaction kicks in.
    pub fn turn_allowance(&self) -> usize {
        self.max_tokens.saturating_sub(self.summary_reserve_tokens)
    }

    // ==================== Builder Methods ====================

    pub fn with_max_tokens(mut self, tokens: usize) -> Self {
        self.max_tokens = tokens;
        self
    }

    pub fn with_summary_reserve_tokens(mut self, tokens: usize) -> Self {
        self.summary_reserve_tokens = tokens;
        self
    }

    pub fn with_fallback_recent_turns(mut self, count: usize) -> Self {
        self.fallback_recent_turns = count;
        self
    }

    // ==================== Validation ====================

    /// Validate this budget, returning a list of issues.
    ///
    /// Rules:
    /// - `1 <= summary_reserve_tokens < max_tokens`
    /// - `fallback_recent_turns >= 1`
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.summary_reserve_tokens == 0 {
            issues.push("memory: summary_reserve_tokens must be >= 1".to_string());
        }
        if self.summary_reserve_tokens >= self.max_tokens {
            issues.push(format!(
                "memory: summary_reserve_tokens ({}) must be < max_tokens ({})",
                self.summary_reserve_tokens, self.max_tokens
            ));
        }
        if self.fallback_recent_turns < 1 {
            issues.push("memory: fallback_recent_turns must be >= 1".to_string());
        }
        issues
    }
}

impl Default for MemoryBudget {
    /// Default: 300 tokens, 100 of them reserved for the summary, 4 turns kept
    /// on fallback.
    fn default() -> Self {
        Self {
            max_tokens: 300,
            summary_reserve_tokens: 100,
            fallback_recent_turns: 4,
        }
    }
}
