//! Session types: the phase of the current attempt and per-process flags.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// The phase the orchestrator's current attempt is in.
///
/// ```text
///                   ┌──→ CheckingExistingAuth ──────────┐
///   Idle ──(begin)──┼──→ AuthenticatingWithCredentials ─┼──→ ResolvingUserProfile ──┐
///     ↑             └──→ LoggingOut ──┐                 │                           │
///     │                               │                 │                           │
///     └───────────────(attempt ends, any outcome)───────┴───────────────────────────┘
/// ```
///
/// - **Idle**: nothing running; a guarded operation may start.
/// - **CheckingExistingAuth**: silent re-authentication is asking the
///   provider for a still-valid identity.
/// - **AuthenticatingWithCredentials**: credentials were submitted to the
///   provider.
/// - **ResolvingUserProfile**: the provider said yes and the cached user
///   wasn't trusted, so the remote profile is being fetched.
/// - **LoggingOut**: the logout sequence is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    CheckingExistingAuth,
    AuthenticatingWithCredentials,
    ResolvingUserProfile,
    LoggingOut,
}

impl SessionStatus {
    /// `true` for every status except `Idle`.
    pub fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::CheckingExistingAuth => write!(f, "CheckingExistingAuth"),
            Self::AuthenticatingWithCredentials => {
                write!(f, "AuthenticatingWithCredentials")
            }
            Self::ResolvingUserProfile => write!(f, "ResolvingUserProfile"),
            Self::LoggingOut => write!(f, "LoggingOut"),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionFlags
// ---------------------------------------------------------------------------

/// Flags that live as long as the orchestrator (in practice: the process).
///
/// There is no way to clear `authenticated_this_session`; a new process
/// (or a new orchestrator) starts with it `false`.
#[derive(Debug, Default)]
pub struct SessionFlags {
    authenticated_this_session: AtomicBool,
}

impl SessionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any authentication has been finalized since startup.
    pub fn authenticated_this_session(&self) -> bool {
        self.authenticated_this_session.load(Ordering::Acquire)
    }

    /// Records that an authentication was finalized.
    pub fn mark_authenticated(&self) {
        self.authenticated_this_session.store(true, Ordering::Release);
    }
}
