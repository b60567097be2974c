//! Fire-and-forget side effects.
//!
//! Some effects of a successful authentication (running the
//! `DidAuthenticate` hook, marking the user online, publishing a first
//! profile) must not hold up or fail the caller. They are started with
//! [`detach`], which spawns them and routes any error to an
//! [`ErrorSink`]. Nothing is ever dropped silently.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::AuthError;

/// Receives errors from detached tasks.
///
/// This is where a crash reporter plugs in.
pub trait ErrorSink: Send + Sync + 'static {
    /// `task` names what failed, e.g. `"profile-push"`.
    fn report(&self, task: &'static str, error: &AuthError);
}

/// The default sink: logs at `error` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl ErrorSink for TracingErrorSink {
    fn report(&self, task: &'static str, error: &AuthError) {
        tracing::error!(task, error = %error, "detached task failed");
    }
}

/// Runs `future` in the background; if it fails, reports to `sink`.
///
/// The returned handle can be awaited (tests do), but nobody has to.
/// Must be called from within a Tokio runtime.
pub fn detach<F>(task: &'static str, sink: Arc<dyn ErrorSink>, future: F) -> JoinHandle<()>
where
    F: Future<Output = Result<(), AuthError>> + Send + 'static,
{
    tokio::spawn(async move {
        match future.await {
            Ok(()) => tracing::trace!(task, "detached task finished"),
            Err(error) => sink.report(task, &error),
        }
    })
}
