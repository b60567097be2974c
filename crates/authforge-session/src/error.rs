//! Error types for the session layer.

use crate::SessionStatus;

/// Errors that can occur while managing session state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Another authentication attempt (or a logout) is still running.
    /// Carries the status that attempt is in.
    ///
    /// Guarded operations fail with this immediately; they never queue
    /// behind the running attempt.
    #[error("authentication already in progress ({0})")]
    AuthInProgress(SessionStatus),
}
