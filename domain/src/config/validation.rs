//! Configuration issues.
//!
//! Loading never hard-fails on a questionable value: each problem is
//! reported as a [`ConfigIssue`] and the affected section falls back to
//! its default.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The value cannot be used; a default was substituted.
    Error,
    /// The value works but probably not as intended.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// `[memory]` budget is inconsistent.
    InvalidMemoryBudget,
    /// `[dispatch]` timeout or input limit is zero.
    InvalidDispatchLimits,
    /// `[storage]` names an unknown backend or lacks its required field.
    InvalidStorage,
    /// A backend is configured whose feature was compiled out.
    BackendUnavailable,
    /// `[text]` or `[image]` generation parameters are out of range.
    InvalidGenerationParams,
}

/// A detected configuration issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
