//! Conversation entities

use crate::generation::artifact::ArtifactHandle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Prefix used when a turn is rendered into prompt context.
    pub fn prompt_prefix(&self) -> &'static str {
        match self {
            Role::User => "Human",
            Role::Assistant => "AI",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single utterance in a conversation (Entity)
///
/// Turns are immutable once created: all fields are private and only
/// exposed through accessors. Artifacts produced by image or speech
/// requests ride along as handles so the turn log can display them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    artifacts: Vec<ArtifactHandle>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp,
            artifacts: Vec::new(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, Utc::now())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, Utc::now())
    }

    /// Attach artifact handles (image or audio) to this turn.
    pub fn with_artifacts(mut self, artifacts: Vec<ArtifactHandle>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn artifacts(&self) -> &[ArtifactHandle] {
        &self.artifacts
    }

    /// Render the turn as a single prompt line, e.g. `Human: Hello`.
    pub fn render(&self) -> String {
        format!("{}: {}", self.role.prompt_prefix(), self.content)
    }

    /// Copy of this turn with its content replaced.
    ///
    /// Used by memory when a turn must be shortened to fit the budget;
    /// the original in the turn log is left untouched.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            role: self.role,
            content: content.into(),
            timestamp: self.timestamp,
            artifacts: self.artifacts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_uses_prompt_prefix() {
        assert_eq!(Turn::user("Hello").render(), "Human: Hello");
        assert_eq!(Turn::assistant("Hi there").render(), "AI: Hi there");
    }

    #[test]
    fn test_role_serde_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_with_content_keeps_role_and_timestamp() {
        let turn = Turn::user("a long message");
        let short = turn.with_content("a long");
        assert_eq!(short.role(), Role::User);
        assert_eq!(short.timestamp(), turn.timestamp());
        assert_eq!(turn.content(), "a long message");
    }

    #[test]
    fn test_artifacts_skipped_when_empty() {
        let json = serde_json::to_value(Turn::user("x")).unwrap();
        assert!(json.get("artifacts").is_none());
    }
}
