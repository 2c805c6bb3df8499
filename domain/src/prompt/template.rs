//! Prompt templates for conversation and summarization

/// Templates for the prompts sent to the text generator
pub struct PromptTemplate;

impl PromptTemplate {
    /// Preamble of every conversation prompt
    pub fn conversation_preamble() -> &'static str {
        r#"The following is a friendly conversation between a human and an AI.
The AI is talkative and provides lots of specific details from its context.
If the AI does not know the answer to a question, it truthfully says it does not know."#
    }

    /// Full conversation prompt: preamble, memory context, then the new input.
    ///
    /// The trailing `AI:` leaves the model to complete the assistant line;
    /// generation is stopped at the next `Human:`.
    pub fn conversation(history: &str, input: &str) -> String {
        let mut prompt = format!(
            "{}\n\nCurrent conversation:\n",
            Self::conversation_preamble()
        );
        if !history.is_empty() {
            prompt.push_str(history);
            prompt.push('\n');
        }
        prompt.push_str(&format!("Human: {}\nAI:", input));
        prompt
    }

    /// Progressive summary: fold new lines into an existing summary.
    pub fn progressive_summary(current_summary: &str, new_lines: &str) -> String {
        format!(
            r#"Progressively summarize the lines of conversation provided, adding onto the previous summary and returning a new summary.
Keep the new summary short and in the third person.

EXAMPLE
Current summary:
The human asks the AI for a pasta recipe. The AI suggests spaghetti aglio e olio.

New lines of conversation:
Human: Can I make it without garlic?
AI: Yes, shallots or chili flakes work as a substitute.

New summary:
The human asks the AI for a pasta recipe. The AI suggests spaghetti aglio e olio and says shallots or chili flakes can replace garlic.
END OF EXAMPLE

Current summary:
{}

New lines of conversation:
{}

New summary:"#,
            current_summary, new_lines
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_with_history() {
        let prompt = PromptTemplate::conversation("Human: Hello\nAI: Hi there", "How are you?");
        assert!(prompt.starts_with("The following is a friendly conversation"));
        assert!(prompt.ends_with(
            "Current conversation:\nHuman: Hello\nAI: Hi there\nHuman: How are you?\nAI:"
        ));
    }

    #[test]
    fn test_conversation_without_history() {
        let prompt = PromptTemplate::conversation("", "Hello");
        assert!(prompt.ends_with("Current conversation:\nHuman: Hello\nAI:"));
    }

    #[test]
    fn test_progressive_summary_places_inputs() {
        let prompt = PromptTemplate::progressive_summary("old summary", "Human: hi");
        assert!(prompt.contains("Current summary:\nold summary\n\nNew lines of conversation:\nHuman: hi"));
        assert!(prompt.ends_with("New summary:"));
    }
}
