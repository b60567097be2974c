//! Error types for collaborator calls.

/// A failure reported by the identity provider.
///
/// Provider SDKs have their own error codes; a [`crate::IdentityProvider`]
/// implementation translates them into these variants before returning.
/// That translation is the only place provider-specific codes are seen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// Wrong password, or a malformed credential.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account exists for the given email.
    #[error("user not found")]
    UserNotFound,

    /// Registration with an email that already has an account.
    #[error("email address already in use")]
    EmailAlreadyInUse,

    /// The provider rejected the password as too weak.
    #[error("password too weak: {0}")]
    WeakPassword(String),

    /// The custom token was unknown, expired or malformed.
    #[error("invalid custom token")]
    InvalidCustomToken,

    /// This sign-in method is switched off on the provider side.
    #[error("operation not allowed: {0}")]
    OperationNotAllowed(String),

    /// The call needs a signed-in user and there is none.
    #[error("no user is signed in")]
    NotSignedIn,

    /// The provider couldn't be reached.
    #[error("network error: {0}")]
    Network(String),

    /// Anything the translation layer has no better variant for.
    #[error("{0}")]
    Other(String),
}

/// A failure reported by one of the non-provider collaborators: profile
/// store, remote config store, hook dispatcher, presence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The backing service couldn't be reached.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The request was cancelled before it completed (for example a
    /// database listener that was torn down).
    #[error("request cancelled: {0}")]
    Cancelled(String),

    /// The service answered but refused the request.
    #[error("request rejected: {0}")]
    Rejected(String),
}
