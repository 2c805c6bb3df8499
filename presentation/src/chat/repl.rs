//! REPL (Read-Eval-Print Loop) for interactive chat

use super::command::{ReplCommand, load_audio_request};
use crate::config::ReplConfig;
use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::ProgressReporter;
use colored::Colorize;
use palaver_application::{NoProgress, RequestDispatcher, SharedSession, lock_session};
use palaver_domain::{GenerationRequest, OutputFormat};
use reedline::{
    DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, ReedlineError, Signal,
};
use std::sync::Arc;

const HISTORY_CAPACITY: usize = 1_000;

/// Interactive chat REPL bound to a single session
pub struct ChatRepl {
    dispatcher: Arc<RequestDispatcher>,
    session: SharedSession,
    config: ReplConfig,
}

impl ChatRepl {
    pub fn new(dispatcher: Arc<RequestDispatcher>, session: SharedSession) -> Self {
        Self {
            dispatcher,
            session,
            config: ReplConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReplConfig) -> Self {
        self.config = config;
        self
    }

    fn editor(&self) -> Result<Reedline, ReedlineError> {
        let editor = Reedline::create();
        let Some(ref path) = self.config.history_file else {
            return Ok(editor);
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let history = FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone())?;
        Ok(editor.with_history(Box::new(history)))
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> Result<(), ReedlineError> {
        let mut editor = self.editor()?;
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("palaver".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            let line = match editor.read_line(&prompt) {
                Ok(Signal::Success(line)) => line,
                Ok(Signal::CtrlC) => {
                    println!("^C");
                    continue;
                }
                Ok(Signal::CtrlD) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {}", err);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            if !self.handle_line(&line).await {
                break;
            }
        }

        Ok(())
    }

    /// Process one input line. Returns `false` when the user asked to quit.
    async fn handle_line(&self, line: &str) -> bool {
        let request = match ReplCommand::parse(line) {
            ReplCommand::Quit => {
                println!("Bye!");
                return false;
            }
            ReplCommand::Help => {
                Self::print_help();
                return true;
            }
            ReplCommand::History => {
                let session = lock_session(&self.session);
                println!("{}", ConsoleFormatter::format_history(session.turns()));
                return true;
            }
            ReplCommand::Memory => {
                let session = lock_session(&self.session);
                print!(
                    "{}",
                    ConsoleFormatter::format_memory(
                        session.memory(),
                        self.dispatcher.config().memory()
                    )
                );
                return true;
            }
            ReplCommand::Invalid(message) => {
                println!("{}", message);
                return true;
            }
            ReplCommand::Say(text) => GenerationRequest::text(text),
            ReplCommand::Image(prompt) => GenerationRequest::image(prompt),
            ReplCommand::Speak(text) => GenerationRequest::speech(text),
            ReplCommand::Transcribe(path) => match load_audio_request(&path).await {
                Ok(request) => request,
                Err(e) => {
                    println!("{} {}", "Error:".red().bold(), e);
                    return true;
                }
            },
        };

        self.dispatch(request).await;
        true
    }

    async fn dispatch(&self, request: GenerationRequest) {
        let result = if self.config.show_progress {
            let progress = ProgressReporter::new();
            self.dispatcher
                .handle_with_progress(&self.session, request, &progress)
                .await
        } else {
            self.dispatcher
                .handle_with_progress(&self.session, request, &NoProgress)
                .await
        };
        println!("{}", ConsoleFormatter::render(&result, OutputFormat::Text));
        println!();
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│               Palaver - Chat                │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Session {}",
            lock_session(&self.session).id().short().dimmed()
        );
        Self::print_help();
    }

    fn print_help() {
        println!();
        println!("Commands:");
        println!("  /image <prompt>     - Generate images");
        println!("  /speak <text>       - Synthesize speech");
        println!("  /transcribe <path>  - Transcribe a .wav or .mp3 file");
        println!("  /history            - Show the conversation so far");
        println!("  /memory             - Show the summarized memory");
        println!("  /help, /h, /?       - Show this help");
        println!("  /quit, /exit, /q    - Exit chat");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use palaver_application::{
        ArtifactStore, Backends, ImageGenerator, PalaverConfig, SpeechSynthesizer,
        SpeechTranscriber, StoreError, TextGenerator,
    };
    use palaver_domain::{
        ArtifactHandle, ArtifactKey, AudioEncoding, BackendError, ImageGenerationConfig, Session,
        TextGenerationConfig,
    };
    use std::sync::Mutex;
    use std::time::Duration;

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        async fn complete(
            &self,
            _context: &str,
            input: &str,
            _config: &TextGenerationConfig,
            _timeout: Duration,
        ) -> Result<String, BackendError> {
            Ok(format!("echo: {}", input))
        }

        async fn summarize(
            &self,
            current_summary: &str,
            _new_lines: &str,
            _config: &TextGenerationConfig,
            _timeout: Duration,
        ) -> Result<String, BackendError> {
            Ok(current_summary.to_string())
        }
    }

    struct Offline;

    fn offline() -> BackendError {
        BackendError::ServiceUnavailable("offline".to_string())
    }

    #[async_trait]
    impl ImageGenerator for Offline {
        async fn generate(
            &self,
            _prompt: &str,
            _config: &ImageGenerationConfig,
            _timeout: Duration,
        ) -> Result<Vec<Vec<u8>>, BackendError> {
            Err(offline())
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for Offline {
        async fn synthesize(
            &self,
            _text: &str,
            _language: &str,
            _timeout: Duration,
        ) -> Result<Vec<u8>, BackendError> {
            Err(offline())
        }
    }

    #[async_trait]
    impl SpeechTranscriber for Offline {
        async fn transcribe(
            &self,
            _audio: &[u8],
            _encoding: AudioEncoding,
            _timeout: Duration,
        ) -> Result<String, BackendError> {
            Err(offline())
        }
    }

    #[async_trait]
    impl ArtifactStore for Offline {
        async fn put(
            &self,
            _key: &ArtifactKey,
            _payload: &[u8],
            _content_type: &str,
        ) -> Result<ArtifactHandle, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
    }

    fn repl() -> ChatRepl {
        let offline = Arc::new(Offline);
        let backends = Backends::new(
            Arc::new(Echo),
            offline.clone(),
            offline.clone(),
            offline.clone(),
            offline,
        );
        let dispatcher = Arc::new(RequestDispatcher::new(backends, PalaverConfig::default()));
        let session = Arc::new(Mutex::new(Session::new()));
        ChatRepl::new(dispatcher, session).with_config(
            ReplConfig::default()
                .with_progress(false)
                .without_history_file(),
        )
    }

    #[tokio::test]
    async fn test_chat_line_appends_turns() {
        let repl = repl();
        assert!(repl.handle_line("Hello").await);

        let session = lock_session(&repl.session);
        assert_eq!(session.turns().len(), 2);
        assert_eq!(session.turns()[1].content(), "echo: Hello");
    }

    #[tokio::test]
    async fn test_quit_and_local_commands() {
        let repl = repl();
        assert!(repl.handle_line("/history").await);
        assert!(repl.handle_line("/bogus").await);
        assert!(!repl.handle_line("/quit").await);
        assert!(lock_session(&repl.session).turns().is_empty());
    }

    #[tokio::test]
    async fn test_failed_image_leaves_log_unchanged() {
        let repl = repl();
        assert!(repl.handle_line("/image a kite").await);
        assert!(lock_session(&repl.session).turns().is_empty());
    }
}
