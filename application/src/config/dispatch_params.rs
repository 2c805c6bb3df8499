//! Dispatch parameters — request handling limits.
//!
//! [`DispatchParams`] groups the static limits the
//! [`RequestDispatcher`](crate::use_cases::dispatch::RequestDispatcher)
//! applies to every request. These are application-layer concerns, not
//! domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request handling limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchParams {
    /// Deadline for each backend call. An expired call becomes a `Timeout`.
    pub backend_timeout: Duration,
    /// Upper bound on the character length of textual request fields.
    pub max_input_chars: usize,
    /// Inactivity after which a session may be evicted.
    pub session_idle_timeout: Duration,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            backend_timeout: Duration::from_secs(60),
            max_input_chars: 4_000,
            session_idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

impl DispatchParams {
    // ==================== Builder Methods ====================

    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = max;
        self
    }

    pub fn with_session_idle_timeout(mut self, timeout: Duration) -> Self {
        self.session_idle_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = DispatchParams::default();
        assert_eq!(params.backend_timeout, Duration::from_secs(60));
        assert_eq!(params.max_input_chars, 4_000);
        assert_eq!(params.session_idle_timeout, Duration::from_secs(1800));
    }

    #[test]
    fn test_builder() {
        let params = DispatchParams::default()
            .with_backend_timeout(Duration::from_millis(50))
            .with_max_input_chars(10);
        assert_eq!(params.backend_timeout, Duration::from_millis(50));
        assert_eq!(params.max_input_chars, 10);
    }
}
