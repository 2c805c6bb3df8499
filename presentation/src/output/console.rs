//! Console output formatter for generation results

use colored::Colorize;
use palaver_domain::{
    ArtifactHandle, ConfigIssue, GenerationFailure, GenerationResult, MemoryBudget, MemoryState,
    OutputFormat, Role, Severity, Turn,
};
use serde_json::json;

/// Formats results, history, and memory for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a result in the requested output format
    pub fn render(result: &GenerationResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => Self::format(result),
            OutputFormat::Json => Self::format_json(result),
        }
    }

    /// Human-readable rendering of a result
    pub fn format(result: &GenerationResult) -> String {
        match result {
            GenerationResult::Text(Ok(reply)) => reply.trim().to_string(),
            GenerationResult::SpeechTranscription(Ok(transcript)) => {
                format!("{} {}", "Transcript:".cyan().bold(), transcript)
            }
            GenerationResult::Image(Ok(handles)) => {
                let mut output = format!(
                    "{} {} image(s)",
                    "Generated".green().bold(),
                    handles.len()
                );
                for handle in handles {
                    output.push_str(&format!("\n  {}", Self::artifact_line(handle)));
                }
                output
            }
            GenerationResult::SpeechSynthesis(Ok(handle)) => {
                format!("{} {}", "Saved".green().bold(), Self::artifact_line(handle))
            }
            _ => match result.failure() {
                Some(failure) => Self::format_failure(failure),
                None => String::new(),
            },
        }
    }

    /// Format as JSON
    pub fn format_json(result: &GenerationResult) -> String {
        let value = match result.failure() {
            None => json!({
                "kind": result.kind().as_str(),
                "success": true,
                "text": result.text(),
                "artifacts": result.artifacts(),
            }),
            Some(failure) => json!({
                "kind": result.kind().as_str(),
                "success": false,
                "error": {
                    "code": failure.code(),
                    "message": failure.to_string(),
                    "retryable": failure.is_retryable(),
                },
            }),
        };
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn format_failure(failure: &GenerationFailure) -> String {
        let hint = if failure.is_retryable() {
            " (try again)"
        } else {
            ""
        };
        format!("{} {}{}", "Error:".red().bold(), failure, hint.dimmed())
    }

    /// The session's turn log, oldest first
    pub fn format_history(turns: &[Turn]) -> String {
        if turns.is_empty() {
            return "No turns yet.".dimmed().to_string();
        }
        turns
            .iter()
            .map(|turn| {
                let speaker = match turn.role() {
                    Role::User => "You:".yellow().bold(),
                    Role::Assistant => "AI:".cyan().bold(),
                };
                let mut line = format!("{} {}", speaker, turn.content());
                for handle in turn.artifacts() {
                    line.push_str(&format!("\n     {}", Self::artifact_line(handle)));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Memory contents and their size against the budget
    pub fn format_memory(memory: &MemoryState, budget: &MemoryBudget) -> String {
        let mut output = format!(
            "{} {}/{} tokens ({} turns)\n",
            "Memory:".cyan().bold(),
            memory.size_estimate(),
            budget.max_tokens(),
            memory.turn_count()
        );
        if memory.running_summary().is_empty() {
            output.push_str(&format!("{}\n", "Summary: (none)".dimmed()));
        } else {
            output.push_str(&format!(
                "{}\n{}\n",
                "Summary:".bold(),
                Self::indent(memory.running_summary(), "  ")
            ));
        }
        for turn in memory.recent_turns() {
            output.push_str(&format!("  {}\n", turn.render()));
        }
        output
    }

    pub fn format_issue(issue: &ConfigIssue) -> String {
        match issue.severity {
            Severity::Error => format!("{} {}", "config error:".red().bold(), issue.message),
            Severity::Warning => format!("{} {}", "config warning:".yellow(), issue.message),
        }
    }

    fn artifact_line(handle: &ArtifactHandle) -> String {
        format!(
            "{} ({}, {} bytes)",
            handle.location, handle.content_type, handle.size_bytes
        )
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
