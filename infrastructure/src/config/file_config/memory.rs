//! Memory budget configuration from TOML (`[memory]` section)

use palaver_domain::{ConfigIssue, ConfigIssueCode, MemoryBudget};
use serde::{Deserialize, Serialize};

/// Memory budget configuration from TOML.
///
/// # Example
///
/// ```toml
/// [memory]
/// max_tokens = 300
/// summary_reserve_tokens = 100
/// fallback_recent_turns = 4
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMemoryConfig {
    /// Upper bound on the memory size estimate, in tokens.
    pub max_tokens: usize,
    /// Part of the budget kept free for the running summary.
    pub summary_reserve_tokens: usize,
    /// Turns kept verbatim when summarization fails.
    pub fallback_recent_turns: usize,
}

impl Default for FileMemoryConfig {
    fn default() -> Self {
        let budget = MemoryBudget::default();
        Self {
            max_tokens: budget.max_tokens(),
            summary_reserve_tokens: budget.summary_reserve_tokens(),
            fallback_recent_turns: budget.fallback_recent_turns(),
        }
    }
}

impl FileMemoryConfig {
    /// Convert to domain `MemoryBudget`, returning validation issues.
    ///
    /// An inconsistent budget falls back to `MemoryBudget::default()` and
    /// each violated rule is reported as a warning.
    pub fn to_budget(&self) -> (MemoryBudget, Vec<ConfigIssue>) {
        let budget = MemoryBudget::new(
            self.max_tokens,
            self.summary_reserve_tokens,
            self.fallback_recent_turns,
        );
        let errors = budget.validate();
        if errors.is_empty() {
            return (budget, vec![]);
        }
        let issues = errors
            .into_iter()
            .map(|msg| {
                ConfigIssue::warning(
                    ConfigIssueCode::InvalidMemoryBudget,
                    format!("{}; using default memory budget", msg),
                )
            })
            .collect();
        (MemoryBudget::default(), issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_config_default() {
        let config = FileMemoryConfig::default();
        assert_eq!(config.max_tokens, 300);
        assert_eq!(config.summary_reserve_tokens, 100);
        assert_eq!(config.fallback_recent_turns, 4);
    }

    #[test]
    fn test_memory_config_deserialize() {
        let toml_str = r#"
[memory]
max_tokens = 600
summary_reserve_tokens = 150
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.memory.max_tokens, 600);
        assert_eq!(config.memory.summary_reserve_tokens, 150);
        assert_eq!(config.memory.fallback_recent_turns, 4);
    }

    #[test]
    fn test_invalid_budget_falls_back_to_default() {
        let config = FileMemoryConfig {
            max_tokens: 50,
            summary_reserve_tokens: 50,
            fallback_recent_turns: 0,
        };
        let (budget, issues) = config.to_budget();
        assert_eq!(issues.len(), 2);
        assert!(
            issues
                .iter()
                .all(|i| i.code == ConfigIssueCode::InvalidMemoryBudget)
        );
        assert_eq!(budget, MemoryBudget::default());
    }
}
