//! Dispatch limits from TOML (`[dispatch]` section)

use palaver_application::DispatchParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatchConfig {
    /// Deadline for each backend call, in seconds.
    pub timeout_secs: u64,
    /// Longest accepted prompt or input text, in characters.
    pub max_input_chars: usize,
    /// Idle minutes before a session may be evicted.
    pub session_idle_minutes: u64,
}

impl Default for FileDispatchConfig {
    fn default() -> Self {
        let params = DispatchParams::default();
        Self {
            timeout_secs: params.backend_timeout.as_secs(),
            max_input_chars: params.max_input_chars,
            session_idle_minutes: params.session_idle_timeout.as_secs() / 60,
        }
    }
}

impl FileDispatchConfig {
    pub fn to_params(&self) -> DispatchParams {
        DispatchParams::default()
            .with_backend_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_input_chars(self.max_input_chars)
            .with_session_idle_timeout(Duration::from_secs(
                self.session_idle_minutes.saturating_mul(60),
            ))
    }
}
