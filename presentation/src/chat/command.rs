//! Parsing of REPL input lines

use palaver_domain::{AudioEncoding, GenerationRequest};
use std::io;
use std::path::{Path, PathBuf};

/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Plain text, sent as a chat message
    Say(String),
    Image(String),
    Speak(String),
    Transcribe(PathBuf),
    History,
    Memory,
    Help,
    Quit,
    /// A slash command that is malformed or unknown; holds the message to show
    Invalid(String),
}

impl ReplCommand {
    /// Parse a trimmed, non-empty input line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return ReplCommand::Say(line.to_string());
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match name {
            "quit" | "exit" | "q" => ReplCommand::Quit,
            "help" | "h" | "?" => ReplCommand::Help,
            "history" => ReplCommand::History,
            "memory" => ReplCommand::Memory,
            "image" | "img" => Self::with_arg(arg, "/image <prompt>", ReplCommand::Image),
            "speak" | "say" => Self::with_arg(arg, "/speak <text>", ReplCommand::Speak),
            "transcribe" => Self::with_arg(arg, "/transcribe <path>", |p| {
                ReplCommand::Transcribe(PathBuf::from(p))
            }),
            other => ReplCommand::Invalid(format!(
                "Unknown command: /{}\nType /help for available commands",
                other
            )),
        }
    }

    fn with_arg(arg: &str, usage: &str, build: impl FnOnce(String) -> Self) -> Self {
        if arg.is_empty() {
            ReplCommand::Invalid(format!("Usage: {}", usage))
        } else {
            build(arg.to_string())
        }
    }
}

/// Read an audio file into a transcription request.
///
/// The encoding comes from the file extension (`.wav` or `.mp3`).
pub async fn load_audio_request(path: &Path) -> io::Result<GenerationRequest> {
    let encoding = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(AudioEncoding::from_extension)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{}: expected a .wav or .mp3 file", path.display()),
            )
        })?;
    let audio = tokio::fs::read(path).await?;
    Ok(GenerationRequest::transcription(audio, encoding))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(
            ReplCommand::parse("  hello there "),
            ReplCommand::Say("hello there".to_string())
        );
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            ReplCommand::parse("/image a red  kite"),
            ReplCommand::Image("a red  kite".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/speak Good morning"),
            ReplCommand::Speak("Good morning".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/transcribe notes/memo.wav"),
            ReplCommand::Transcribe(PathBuf::from("notes/memo.wav"))
        );
    }

    #[test]
    fn test_missing_argument_shows_usage() {
        assert_eq!(
            ReplCommand::parse("/image"),
            ReplCommand::Invalid("Usage: /image <prompt>".to_string())
        );
    }

    #[test]
    fn test_unknown_and_bare_commands() {
        assert_eq!(ReplCommand::parse("/q"), ReplCommand::Quit);
        assert_eq!(ReplCommand::parse("/memory"), ReplCommand::Memory);
        assert!(matches!(ReplCommand::parse("/dance"), ReplCommand::Invalid(_)));
    }

    #[tokio::test]
    async fn test_load_audio_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.MP3");
        std::fs::write(&path, b"ID3data").unwrap();

        let request = load_audio_request(&path).await.unwrap();
        assert_eq!(
            request,
            GenerationRequest::transcription(b"ID3data".to_vec(), AudioEncoding::Mp3)
        );
    }

    #[tokio::test]
    async fn test_load_audio_rejects_unknown_extension() {
        let err = load_audio_request(Path::new("memo.ogg")).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
