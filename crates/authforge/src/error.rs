//! Unified error type for the orchestrator.

use authforge_gateway::{ProviderError, ServiceError};
use authforge_protocol::{AccountType, HookEvent, ProtocolError};
use authforge_session::{SessionError, SessionStatus};

/// Everything an [`AuthenticationHandler`](crate::AuthenticationHandler)
/// operation can fail with.
///
/// Each operation reports exactly one of these, or success. Failures of
/// fire-and-forget side effects are also expressed as `AuthError`, but
/// they are handed to the [`ErrorSink`](crate::ErrorSink), never returned.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Another authenticate or logout is running. Carries its status.
    #[error("can't run two authentication attempts in parallel (current status: {0})")]
    AuthInProgress(SessionStatus),

    /// Silent re-authentication found no identity to resume.
    #[error("no authentication data found")]
    NoAuthData,

    /// The credentials are of a kind this orchestrator doesn't sign in
    /// with (federated logins belong to the social-login module).
    #[error("no matching login type for {0}")]
    NoMatchingLoginType(AccountType),

    /// The identity provider refused or failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Reading the remote configuration failed.
    #[error("remote config retrieval failed: {0}")]
    RemoteConfig(#[source] ServiceError),

    /// Fetching or pushing the remote profile failed.
    #[error("profile sync failed: {0}")]
    ProfileSync(#[source] ServiceError),

    /// A lifecycle hook failed.
    #[error("{hook} hook failed: {source}")]
    Hook {
        hook: HookEvent,
        #[source]
        source: ServiceError,
    },

    /// Setting the user online or offline failed.
    #[error("presence update failed: {0}")]
    Presence(#[source] ServiceError),

    /// The remote profile document couldn't be merged.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The builder was missing a required collaborator.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// The operation's task panicked or was aborted.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::AuthInProgress(status) => Self::AuthInProgress(status),
        }
    }
}

impl AuthError {
    pub(crate) fn hook(hook: HookEvent) -> impl FnOnce(ServiceError) -> Self {
        move |source| Self::Hook { hook, source }
    }
}
