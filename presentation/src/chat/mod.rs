//! Interactive chat module
//!
//! Provides a line-editor based chat interface over one session.

mod command;
mod repl;

pub use command::{ReplCommand, load_audio_request};
pub use repl::ChatRepl;
