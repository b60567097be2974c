//! The single-flight guard.
//!
//! [`StatusCell`] holds the current [`SessionStatus`]. Starting a guarded
//! operation means atomically checking that the status is `Idle` and
//! moving it to a busy phase; [`StatusCell::try_begin`] does both under
//! one lock and hands back an [`AuthAttempt`]. The attempt is an RAII
//! guard: dropping it puts the status back to `Idle`, so the reset runs on
//! every exit path (early `return`, `?`, panic unwinding) without the
//! orchestrator having to remember it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{SessionError, SessionStatus};

/// Shared, cloneable handle to the session status.
///
/// Clones point at the same status.
#[derive(Debug, Clone, Default)]
pub struct StatusCell {
    status: Arc<Mutex<SessionStatus>>,
}

impl StatusCell {
    /// A new cell in the `Idle` status.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current status.
    pub fn get(&self) -> SessionStatus {
        *self.status.lock()
    }

    /// Whether a guarded operation is running.
    pub fn is_busy(&self) -> bool {
        self.get().is_busy()
    }

    /// Starts an attempt in `phase` if nothing else is running.
    ///
    /// Never waits: if another attempt holds the cell this returns
    /// immediately.
    ///
    /// # Errors
    /// [`SessionError::AuthInProgress`] with the running attempt's status.
    pub fn try_begin(&self, phase: SessionStatus) -> Result<AuthAttempt, SessionError> {
        let mut status = self.status.lock();
        if status.is_busy() {
            tracing::debug!(current = %*status, requested = %phase, "auth attempt rejected");
            return Err(SessionError::AuthInProgress(*status));
        }
        *status = phase;
        drop(status);

        tracing::debug!(status = %phase, "auth attempt started");
        Ok(AuthAttempt { cell: self.clone() })
    }

    fn set(&self, phase: SessionStatus) {
        *self.status.lock() = phase;
    }
}

/// Proof that the caller owns the status cell. Resets it to `Idle` on drop.
///
/// Deliberately not `Clone`: there is exactly one owner per attempt.
#[derive(Debug)]
#[must_use = "dropping the attempt immediately releases the single-flight guard"]
pub struct AuthAttempt {
    cell: StatusCell,
}

impl AuthAttempt {
    /// Moves the running attempt to another busy phase.
    pub fn advance(&self, phase: SessionStatus) {
        tracing::debug!(status = %phase, "auth attempt advanced");
        self.cell.set(phase);
    }

    /// The phase this attempt is in.
    pub fn status(&self) -> SessionStatus {
        self.cell.get()
    }
}

impl Drop for AuthAttempt {
    fn drop(&mut self) {
        self.cell.set(SessionStatus::Idle);
        tracing::debug!("auth attempt finished, status reset to Idle");
    }
}
