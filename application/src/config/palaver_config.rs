//! Palaver configuration container.
//!
//! [`PalaverConfig`] groups the per-concern settings the dispatcher and the
//! memory need. It is built once at startup from the file configuration and
//! stays immutable afterwards.

use crate::config::DispatchParams;
use palaver_domain::{
    ConfigIssue, ConfigIssueCode, ImageGenerationConfig, MemoryBudget, Severity,
    SpeechSynthesisConfig, TextGenerationConfig,
};

#[derive(Debug, Clone, Default)]
pub struct PalaverConfig {
    memory: MemoryBudget,
    text: TextGenerationConfig,
    image: ImageGenerationConfig,
    speech: SpeechSynthesisConfig,
    dispatch: DispatchParams,
}

impl PalaverConfig {
    pub fn new(
        memory: MemoryBudget,
        text: TextGenerationConfig,
        image: ImageGenerationConfig,
        speech: SpeechSynthesisConfig,
        dispatch: DispatchParams,
    ) -> Self {
        Self {
            memory,
            text,
            image,
            speech,
            dispatch,
        }
    }

    // ==================== Accessors ====================

    pub fn memory(&self) -> &MemoryBudget {
        &self.memory
    }

    pub fn text(&self) -> &TextGenerationConfig {
        &self.text
    }

    pub fn image(&self) -> &ImageGenerationConfig {
        &self.image
    }

    pub fn speech(&self) -> &SpeechSynthesisConfig {
        &self.speech
    }

    pub fn dispatch(&self) -> &DispatchParams {
        &self.dispatch
    }

    // ==================== Builder Methods ====================

    pub fn with_memory(mut self, memory: MemoryBudget) -> Self {
        self.memory = memory;
        self
    }

    pub fn with_text(mut self, text: TextGenerationConfig) -> Self {
        self.text = text;
        self
    }

    pub fn with_image(mut self, image: ImageGenerationConfig) -> Self {
        self.image = image;
        self
    }

    pub fn with_speech(mut self, speech: SpeechSynthesisConfig) -> Self {
        self.speech = speech;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchParams) -> Self {
        self.dispatch = dispatch;
        self
    }

    // ==================== Validation ====================

    /// Cross-section validation of the assembled configuration.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<ConfigIssue> = self
            .memory
            .validate()
            .into_iter()
            .map(|msg| ConfigIssue::error(ConfigIssueCode::InvalidMemoryBudget, msg))
            .collect();

        if self.dispatch.backend_timeout.is_zero() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidDispatchLimits,
                "dispatch: timeout must be greater than zero",
            ));
        }
        if self.dispatch.max_input_chars == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidDispatchLimits,
                "dispatch: max_input_chars must be greater than zero",
            ));
        }
        if self.text.max_output_tokens as usize > self.memory.max_tokens() * 4 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidGenerationParams,
                format!(
                    "text: max_output_tokens ({}) is much larger than the memory budget ({}); \
                     long replies will be compacted immediately",
                    self.text.max_output_tokens,
                    self.memory.max_tokens()
                ),
            ));
        }
        if self.image.count == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidGenerationParams,
                "image: count must be at least 1",
            ));
        }
        issues
    }

    /// Check whether any issues are errors (i.e. fatal).
    pub fn has_errors(issues: &[ConfigIssue]) -> bool {
        issues.iter().any(|i| i.severity == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_is_valid() {
        assert!(PalaverConfig::default().validate().is_empty());
    }

    #[test]
    fn test_invalid_memory_is_error() {
        let config = PalaverConfig::default().with_memory(MemoryBudget::new(10, 20, 1));
        let issues = config.validate();
        assert!(PalaverConfig::has_errors(&issues));
        assert_eq!(issues[0].code, ConfigIssueCode::InvalidMemoryBudget);
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let config = PalaverConfig::default()
            .with_dispatch(DispatchParams::default().with_backend_timeout(Duration::ZERO));
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ConfigIssueCode::InvalidDispatchLimits);
    }

    #[test]
    fn test_large_output_is_only_warning() {
        let config = PalaverConfig::default()
            .with_text(TextGenerationConfig::default().with_max_output_tokens(10_000));
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(!PalaverConfig::has_errors(&issues));
    }
}
