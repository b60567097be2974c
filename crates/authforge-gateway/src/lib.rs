//! Collaborator interfaces for Authforge.
//!
//! The orchestrator doesn't talk to an identity provider, a database or a
//! presence service directly. It talks to the traits in this crate, and
//! the application plugs in implementations for whatever backend it runs
//! on (Firebase, a custom auth server, an in-memory fake in tests).
//!
//! # Why boxed futures?
//!
//! Two of the collaborators (hooks and social login) are optional and
//! all of them are chosen at runtime, so the orchestrator stores them as
//! `Arc<dyn Trait>`. A trait with `async fn` isn't object safe, so each
//! async method returns a [`BoxFuture`] instead. Implementations usually
//! write `Box::pin(async move { ... })`.
//!
//! # Feature Flags
//!
//! - `memory` (default) - in-memory implementations for tests and demos

mod error;
#[cfg(feature = "memory")]
mod memory;

pub use error::{ProviderError, ServiceError};
#[cfg(feature = "memory")]
pub use memory::{
    MemoryIdentityProvider, MemoryPresence, MemoryProfileStore,
    MemoryRemoteConfig,
};

use authforge_protocol::{
    AccountType, ConfigMap, HookEvent, HookPayload, LocalUser,
    PasswordChange, ProfileData, ProviderIdentity,
};
pub use futures_util::future::BoxFuture;

/// Result of a sign-in attempt.
pub type SignInResult = Result<ProviderIdentity, ProviderError>;

/// The external identity provider: verifies credentials and issues
/// identities.
///
/// Implementations are the provider-error translation boundary: every
/// failure is returned as an already-translated [`ProviderError`].
/// Timeouts are the implementation's business too; the orchestrator
/// waits for as long as a call takes.
pub trait IdentityProvider: Send + Sync + 'static {
    /// The identity the provider still considers signed in, if any.
    ///
    /// Must not hit the network with credentials; this is what silent
    /// re-authentication on app start uses.
    fn current_identity(&self) -> Option<ProviderIdentity>;

    /// Signs in to an existing email/password account.
    fn sign_in_with_email<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, SignInResult>;

    /// Creates an email/password account and signs in to it.
    fn create_user<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, SignInResult>;

    /// Signs in without credentials.
    fn sign_in_anonymously(&self) -> BoxFuture<'_, SignInResult>;

    /// Signs in with a token minted by the application's backend.
    fn sign_in_with_custom_token<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, SignInResult>;

    /// Forgets the current identity. Local only, never fails.
    fn sign_out(&self);

    /// Changes the signed-in user's password.
    fn update_password<'a>(
        &'a self,
        change: &'a PasswordChange,
    ) -> BoxFuture<'a, Result<(), ProviderError>>;

    /// Emails a password reset link.
    fn send_password_reset<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<(), ProviderError>>;
}

/// The remote store that keeps user profiles.
pub trait ProfileStore: Send + Sync + 'static {
    /// Reads the user's remote profile once. An empty map means the user
    /// has never published one.
    fn fetch_once<'a>(
        &'a self,
        user: &'a LocalUser,
    ) -> BoxFuture<'a, Result<ProfileData, ServiceError>>;

    /// Publishes the user's current fields.
    fn push<'a>(
        &'a self,
        user: &'a LocalUser,
    ) -> BoxFuture<'a, Result<(), ServiceError>>;
}

/// Remote application configuration, read once per authentication.
pub trait RemoteConfigStore: Send + Sync + 'static {
    /// `Ok(None)` when no remote configuration has been published.
    fn fetch_once(&self) -> BoxFuture<'_, Result<Option<ConfigMap>, ServiceError>>;
}

/// The pluggable hook system other modules use to react to
/// authentication events.
pub trait HookDispatcher: Send + Sync + 'static {
    /// Runs every handler registered for `hook`.
    fn execute(
        &self,
        hook: HookEvent,
        payload: HookPayload,
    ) -> BoxFuture<'_, Result<(), ServiceError>>;
}

/// Online/offline presence for the current user.
pub trait Presence: Send + Sync + 'static {
    fn set_online(&self) -> BoxFuture<'_, Result<(), ServiceError>>;
    fn set_offline(&self) -> BoxFuture<'_, Result<(), ServiceError>>;
}

/// The social-login module that owns federated sign-in.
pub trait SocialLogin: Send + Sync + 'static {
    /// Signs out of every federated provider.
    fn logout(&self);

    /// Whether this module can sign in with the given account type.
    fn account_type_enabled(&self, account_type: AccountType) -> bool;
}
