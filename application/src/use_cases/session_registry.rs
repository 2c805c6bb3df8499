//! Session registry.
//!
//! Keeps the live sessions of a process keyed by [`SessionId`]. The registry
//! only hands out shared handles; state changes go through the
//! [`RequestDispatcher`](crate::use_cases::dispatch::RequestDispatcher).
//! When to evict idle sessions is left to the caller.

use crate::use_cases::dispatch::{SharedSession, lock_session};
use chrono::{DateTime, Utc};
use palaver_domain::{Session, SessionId, SessionSummary};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::info;

pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, SharedSession>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    fn sessions(&self) -> std::sync::MutexGuard<'_, HashMap<SessionId, SharedSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new, empty session.
    pub fn create(&self) -> (SessionId, SharedSession) {
        let session = Session::new();
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions().insert(id, handle.clone());
        info!(session = %id, "Session created");
        (id, handle)
    }

    pub fn get(&self, id: SessionId) -> Option<SharedSession> {
        self.sessions().get(&id).cloned()
    }

    /// Summaries of all live sessions, oldest first.
    pub fn list(&self) -> Vec<SessionSummary> {
        let handles: Vec<SharedSession> = self.sessions().values().cloned().collect();
        let mut summaries: Vec<SessionSummary> = handles
            .iter()
            .map(|handle| lock_session(handle).summary())
            .collect();
        summaries.sort_by_key(|s| s.created_at);
        summaries
    }

    /// End a session explicitly. Returns `false` if it was unknown.
    ///
    /// A request already in flight keeps its handle and completes normally.
    pub fn end(&self, id: SessionId) -> bool {
        let removed = self.sessions().remove(&id).is_some();
        if removed {
            info!(session = %id, "Session ended");
        }
        removed
    }

    /// Remove every session idle for longer than the configured timeout.
    ///
    /// Busy sessions are never evicted. Returns the evicted ids.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> Vec<SessionId> {
        let timeout = chrono::Duration::from_std(self.idle_timeout)
            .unwrap_or_else(|_| chrono::Duration::weeks(52 * 100));
        let mut sessions = self.sessions();
        let expired: Vec<SessionId> = sessions
            .iter()
            .filter(|(_, handle)| lock_session(handle).is_idle_longer_than(timeout, now))
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            sessions.remove(id);
            info!(session = %id, "Session evicted after idle timeout");
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }
}
