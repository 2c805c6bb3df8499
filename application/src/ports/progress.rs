//! Progress notification port
//!
//! Lets the presentation layer show activity while a backend call is
//! outstanding.

use palaver_domain::RequestKind;

/// Callback for dispatch progress
pub trait ProgressNotifier: Send + Sync {
    /// A backend call for `kind` is about to start.
    fn on_backend_call(&self, kind: RequestKind);

    /// The request finished, successfully or not.
    fn on_request_finished(&self, kind: RequestKind, success: bool);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_backend_call(&self, _kind: RequestKind) {}
    fn on_request_finished(&self, _kind: RequestKind, _success: bool) {}
}
