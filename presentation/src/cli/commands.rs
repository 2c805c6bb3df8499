//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for one-shot commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Text,
    /// One JSON object per result
    Json,
}

impl From<OutputFormat> for palaver_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => palaver_domain::OutputFormat::Text,
            OutputFormat::Json => palaver_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for palaver
#[derive(Parser, Debug)]
#[command(name = "palaver")]
#[command(author, version, about = "Conversational assistant for text, images, and speech")]
#[command(long_about = r#"
Palaver is a conversational assistant with four modalities: text chat,
image generation, speech synthesis, and speech transcription. Chat history
is kept within a fixed token budget by summarizing older turns.

Configuration files are loaded from (in priority order):
1. PALAVER_* environment variables
2. --config <path>     Explicit config file
3. ./palaver.toml      Project-level config
4. ~/.config/palaver/config.toml   Global config

Example:
  palaver                               Start the chat REPL
  palaver ask "What is a haiku?"
  palaver image "a lighthouse at dusk"
  palaver speak "Good morning"
  palaver transcribe memo.wav
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format for one-shot commands
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Append a JSONL transcript of dispatch events to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub transcript: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the interactive chat REPL (default)
    Chat,
    /// Ask a single question
    Ask {
        /// The message to send
        input: String,
    },
    /// Generate images from a prompt
    Image {
        /// Image description
        prompt: String,
    },
    /// Synthesize speech from text
    Speak {
        /// Text to speak
        text: String,
    },
    /// Transcribe a WAV or MP3 file
    Transcribe {
        /// Audio file path
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_means_chat() {
        let cli = Cli::try_parse_from(["palaver"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_ask_with_global_flags() {
        let cli = Cli::try_parse_from(["palaver", "ask", "hello there", "-vv", "--format", "json"])
            .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Ask {
                input: "hello there".to_string()
            })
        );
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_transcribe_takes_path() {
        let cli = Cli::try_parse_from(["palaver", "transcribe", "memo.mp3"]).unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Transcribe {
                path: PathBuf::from("memo.mp3")
            })
        );
    }
}
