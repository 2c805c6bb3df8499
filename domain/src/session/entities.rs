//! Session domain entities

use crate::conversation::entities::Turn;
use crate::generation::failure::GenerationFailure;
use crate::memory::state::MemoryState;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier of a conversation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// First eight hex digits, for display.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// In-flight status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Busy,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Busy => "busy",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A conversation session (Entity)
///
/// Owns its turn log and its memory exclusively. At most one request is
/// in flight at a time: [`Session::begin_request`] flips the status to
/// `Busy` and refuses a second caller until [`Session::finish_request`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    turns: Vec<Turn>,
    memory: MemoryState,
    status: SessionStatus,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_id(SessionId::new())
    }

    pub fn with_id(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            turns: Vec::new(),
            memory: MemoryState::new(),
            status: SessionStatus::Idle,
            created_at: now,
            last_active: now,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Turn log in append order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn memory(&self) -> &MemoryState {
        &self.memory
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_busy(&self) -> bool {
        self.status == SessionStatus::Busy
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    // ==================== State transitions ====================

    /// Mark the session busy, or fail with `SessionBusy` if it already is.
    pub fn begin_request(&mut self) -> Result<(), GenerationFailure> {
        if self.is_busy() {
            return Err(GenerationFailure::SessionBusy);
        }
        self.status = SessionStatus::Busy;
        self.last_active = Utc::now();
        Ok(())
    }

    /// Return to idle. Safe to call on an idle session.
    pub fn finish_request(&mut self) {
        self.status = SessionStatus::Idle;
        self.last_active = Utc::now();
    }

    /// Append to the turn log. Turns are never edited or removed afterwards.
    pub fn append_turn(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn replace_memory(&mut self, memory: MemoryState) {
        self.memory = memory;
    }

    /// Whether the session has been inactive for longer than `timeout`.
    ///
    /// Busy sessions are never considered idle.
    pub fn is_idle_longer_than(&self, timeout: Duration, now: DateTime<Utc>) -> bool {
        !self.is_busy() && now.signed_duration_since(self.last_active) > timeout
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            status: self.status,
            turn_count: self.turns.len(),
            memory_tokens: self.memory.size_estimate(),
            created_at: self.created_at,
            last_active: self.last_active,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only overview of a session for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub status: SessionStatus,
    pub turn_count: usize,
    pub memory_tokens: usize,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle_and_empty() {
        let session = Session::new();
        assert_eq!(session.status(), SessionStatus::Idle);
        assert!(session.turns().is_empty());
        assert!(session.memory().is_empty());
    }

    #[test]
    fn test_second_begin_is_rejected() {
        let mut session = Session::new();
        session.begin_request().unwrap();
        assert_eq!(session.begin_request(), Err(GenerationFailure::SessionBusy));
        session.finish_request();
        assert!(session.begin_request().is_ok());
    }

    #[test]
    fn test_idle_timeout_ignores_busy_sessions() {
        let mut session = Session::new();
        let later = session.last_active() + Duration::minutes(31);
        assert!(session.is_idle_longer_than(Duration::minutes(30), later));

        session.begin_request().unwrap();
        let later = session.last_active() + Duration::minutes(31);
        assert!(!session.is_idle_longer_than(Duration::minutes(30), later));
    }

    #[test]
    fn test_session_id_parse() {
        let id = SessionId::new();
        assert_eq!(SessionId::parse(&id.to_string()), Some(id));
        assert_eq!(id.short().len(), 8);
        assert_eq!(SessionId::parse("not-a-uuid"), None);
    }

    #[test]
    fn test_summary() {
        let mut session = Session::new();
        session.append_turn(Turn::user("Hello"));
        let summary = session.summary();
        assert_eq!(summary.turn_count, 1);
        assert_eq!(summary.id, session.id());
        assert_eq!(summary.memory_tokens, 0);
    }
}
