//! Progress reporting while a request is in flight

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use palaver_application::ports::progress::ProgressNotifier;
use palaver_domain::RequestKind;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Shows a spinner while a backend call is outstanding
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    /// What the user is waiting for, by modality.
    pub fn activity(kind: RequestKind) -> &'static str {
        match kind {
            RequestKind::Text => "Thinking",
            RequestKind::Image => "Painting",
            RequestKind::SpeechSynthesis => "Recording",
            RequestKind::SpeechTranscription => "Listening",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_backend_call(&self, kind: RequestKind) {
        let mut slot = self.spinner.lock().unwrap_or_else(PoisonError::into_inner);
        let spinner = slot.get_or_insert_with(|| {
            let pb = ProgressBar::new_spinner();
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        });
        spinner.set_prefix(kind.as_str());
        spinner.set_message(format!("{}...", Self::activity(kind)));
    }

    fn on_request_finished(&self, _kind: RequestKind, _success: bool) {
        if let Some(pb) = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_and_clear();
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_backend_call(&self, kind: RequestKind) {
        eprintln!("{} {}...", "->".cyan(), ProgressReporter::activity(kind));
    }

    fn on_request_finished(&self, kind: RequestKind, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), kind);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), kind);
        }
    }
}
