//! The authentication orchestrator.
//!
//! [`AuthenticationHandler`] is the public face of the crate. Its
//! operations fall into two groups:
//!
//! - **Guarded**: [`authenticate`](AuthenticationHandler::authenticate),
//!   [`authenticate_with`](AuthenticationHandler::authenticate_with) and
//!   [`logout`](AuthenticationHandler::logout). Each takes the
//!   single-flight guard before doing anything and fails immediately if
//!   it's taken.
//! - **Unguarded**: password changes, password resets, remote config and
//!   account-type checks. These never touch the session status.
//!
//! A guarded operation takes the guard on the caller's task, then runs
//! the rest on a spawned task that owns the guard. If the caller stops
//! waiting, the provider call still finishes and the guard is released
//! when it does.

use std::future::Future;
use std::sync::Arc;

use authforge_events::EventBus;
use authforge_gateway::{
    HookDispatcher, IdentityProvider, Presence, ProfileStore,
    RemoteConfigStore, SocialLogin,
};
use authforge_protocol::{
    AccountDetails, AccountType, EntityId, HookEvent, HookPayload, LocalUser,
    NetworkEvent, PasswordChange, ProviderIdentity,
};
use authforge_session::{SessionFlags, SessionStatus, StatusCell, UserCache};

use crate::{AuthError, AuthenticationHandlerBuilder, ErrorSink, SharedConfig};

/// State shared by the handler and every task it spawns.
pub(crate) struct Inner {
    pub(crate) config: SharedConfig,
    pub(crate) status: StatusCell,
    pub(crate) flags: SessionFlags,
    pub(crate) provider: Arc<dyn IdentityProvider>,
    pub(crate) cache: Arc<dyn UserCache>,
    pub(crate) profiles: Arc<dyn ProfileStore>,
    pub(crate) remote_config: Option<Arc<dyn RemoteConfigStore>>,
    pub(crate) events: Arc<dyn EventBus>,
    pub(crate) presence: Arc<dyn Presence>,
    pub(crate) hooks: Option<Arc<dyn HookDispatcher>>,
    pub(crate) social: Option<Arc<dyn SocialLogin>>,
    pub(crate) errors: Arc<dyn ErrorSink>,
}

/// Coordinates authentication against the configured collaborators.
///
/// Cheap to clone; clones share the same session status, flags and
/// collaborators. Build one with [`AuthenticationHandler::builder`].
#[derive(Clone)]
pub struct AuthenticationHandler {
    inner: Arc<Inner>,
}

impl AuthenticationHandler {
    pub fn builder() -> AuthenticationHandlerBuilder {
        AuthenticationHandlerBuilder::new()
    }

    pub(crate) fn from_inner(inner: Inner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    // -- Guarded operations ----------------------------------------------

    /// Resumes the session the identity provider still remembers.
    ///
    /// # Errors
    /// - [`AuthError::AuthInProgress`] if another attempt is running
    /// - [`AuthError::NoAuthData`] if the provider has no current identity
    /// - [`AuthError::ProfileSync`] / [`AuthError::Protocol`] if the
    ///   remote profile couldn't be fetched or merged
    pub async fn authenticate(&self) -> Result<(), AuthError> {
        let attempt = self.inner.status.try_begin(SessionStatus::CheckingExistingAuth)?;
        let inner = Arc::clone(&self.inner);

        run_guarded(async move {
            tracing::info!("checking for existing authentication");
            let identity = inner.provider.current_identity().ok_or(AuthError::NoAuthData)?;
            inner.authenticate_with_identity(&attempt, identity).await
        })
        .await
    }

    /// Signs in (or registers) with explicit credentials.
    ///
    /// # Errors
    /// - [`AuthError::AuthInProgress`] if another attempt is running
    /// - [`AuthError::NoMatchingLoginType`] for federated credentials;
    ///   the provider is not contacted
    /// - [`AuthError::Provider`] if the provider refused
    /// - [`AuthError::ProfileSync`] / [`AuthError::Protocol`] as for
    ///   [`authenticate`](Self::authenticate)
    pub async fn authenticate_with(&self, details: AccountDetails) -> Result<(), AuthError> {
        let attempt = self
            .inner
            .status
            .try_begin(SessionStatus::AuthenticatingWithCredentials)?;
        let inner = Arc::clone(&self.inner);

        run_guarded(async move {
            let identity = inner.sign_in(&details).await?;
            inner.authenticate_with_identity(&attempt, identity).await
        })
        .await
    }

    /// Ends the session.
    ///
    /// Runs `WillLogout`, goes offline, deactivates the user context,
    /// signs out of the provider, clears the current user, broadcasts
    /// [`NetworkEvent::Logout`], logs out of social login and runs
    /// `DidLogout`, in that order. A failing step stops the sequence;
    /// steps already done stay done.
    ///
    /// # Errors
    /// - [`AuthError::AuthInProgress`] if another attempt is running
    /// - [`AuthError::Hook`] if `WillLogout` or `DidLogout` failed
    /// - [`AuthError::Presence`] if going offline failed
    pub async fn logout(&self) -> Result<(), AuthError> {
        let attempt = self.inner.status.try_begin(SessionStatus::LoggingOut)?;
        let inner = Arc::clone(&self.inner);

        run_guarded(async move {
            let _attempt = attempt;
            inner.logout().await
        })
        .await
    }

    // -- Unguarded operations --------------------------------------------

    /// Changes the signed-in user's password.
    ///
    /// Independent of the session status: it can run while an
    /// authentication is in progress.
    ///
    /// # Errors
    /// [`AuthError::Provider`] with the provider's reason.
    pub async fn change_password(
        &self,
        email: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let change = PasswordChange {
            email: email.to_string(),
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.inner.provider.update_password(&change).await?;
        tracing::info!(email, "password changed");
        Ok(())
    }

    /// Asks the provider to email a password reset link.
    ///
    /// # Errors
    /// [`AuthError::Provider`] with the provider's reason.
    pub async fn send_password_reset_mail(&self, email: &str) -> Result<(), AuthError> {
        self.inner.provider.send_password_reset(email).await?;
        tracing::info!(email, "password reset mail requested");
        Ok(())
    }

    /// Fetches remote configuration and merges it into
    /// [`config`](Self::config). A no-op when remote config is disabled.
    ///
    /// # Errors
    /// [`AuthError::RemoteConfig`] if the store couldn't be read.
    pub async fn retrieve_remote_config(&self) -> Result<(), AuthError> {
        self.inner.retrieve_remote_config().await
    }

    /// Whether logins of `account_type` are allowed.
    ///
    /// Username and registration logins always are; anonymous follows
    /// [`AuthConfig::anonymous_login_enabled`](crate::AuthConfig); the
    /// rest are up to the social-login module, and denied without one.
    pub fn account_type_enabled(&self, account_type: AccountType) -> bool {
        match account_type {
            AccountType::Anonymous => self.inner.config.settings().anonymous_login_enabled,
            AccountType::Username | AccountType::Register => true,
            AccountType::Custom | AccountType::Federated(_) => self
                .inner
                .social
                .as_ref()
                .is_some_and(|social| social.account_type_enabled(account_type)),
        }
    }

    // -- Queries ---------------------------------------------------------

    pub fn status(&self) -> SessionStatus {
        self.inner.status.get()
    }

    /// Whether a guarded operation is running.
    pub fn is_authenticating(&self) -> bool {
        self.inner.status.is_busy()
    }

    /// Whether the identity provider has a signed-in identity.
    pub fn is_authenticated(&self) -> bool {
        self.inner.provider.current_identity().is_some()
    }

    /// Whether an authentication has been finalized since startup.
    pub fn authenticated_this_session(&self) -> bool {
        self.inner.flags.authenticated_this_session()
    }

    pub fn current_user_id(&self) -> Option<EntityId> {
        self.inner.cache.current_user_id()
    }

    /// The cached record of the current user.
    pub fn current_user(&self) -> Option<LocalUser> {
        self.current_user_id()
            .and_then(|id| self.inner.cache.fetch_by_entity_id(&id))
    }

    pub fn config(&self) -> &SharedConfig {
        &self.inner.config
    }
}

/// Runs a guarded pipeline on its own task and waits for it.
///
/// The pipeline future owns the [`AuthAttempt`](authforge_session::AuthAttempt),
/// so the guard lives exactly as long as the task, including when the
/// caller gives up waiting or the pipeline panics.
async fn run_guarded<F>(pipeline: F) -> Result<(), AuthError>
where
    F: Future<Output = Result<(), AuthError>> + Send + 'static,
{
    match tokio::spawn(pipeline).await {
        Ok(result) => result,
        Err(join_error) => {
            tracing::error!(error = %join_error, "auth pipeline task failed");
            Err(AuthError::Internal(join_error.to_string()))
        }
    }
}

impl Inner {
    /// Submits credentials to the identity provider.
    async fn sign_in(&self, details: &AccountDetails) -> Result<ProviderIdentity, AuthError> {
        let account_type = details.account_type();
        tracing::info!(%account_type, "authenticating with credentials");

        let provider = &self.provider;
        let result = match details {
            AccountDetails::UsernamePassword { username, password } => {
                provider.sign_in_with_email(username, password).await
            }
            AccountDetails::Register { username, password } => {
                provider.create_user(username, password).await
            }
            AccountDetails::Anonymous => provider.sign_in_anonymously().await,
            AccountDetails::CustomToken { token } => {
                provider.sign_in_with_custom_token(token).await
            }
            AccountDetails::Federated { .. } => {
                return Err(AuthError::NoMatchingLoginType(account_type));
            }
        };

        result.map_err(|err| {
            tracing::info!(%account_type, error = %err, "provider rejected credentials");
            AuthError::Provider(err)
        })
    }

    async fn logout(&self) -> Result<(), AuthError> {
        tracing::info!("logging out");

        if let Some(hooks) = &self.hooks {
            hooks
                .execute(HookEvent::WillLogout, HookPayload::empty())
                .await
                .map_err(AuthError::hook(HookEvent::WillLogout))?;
        }

        self.presence.set_offline().await.map_err(AuthError::Presence)?;

        let user = self.cache.current_user_id().map(|id| {
            self.cache
                .fetch_by_entity_id(&id)
                .unwrap_or_else(|| LocalUser::new(id))
        });
        if let Some(user) = &user {
            self.events
                .publish(NetworkEvent::UserContextDeactivated(user.entity_id.clone()));
        }

        self.provider.sign_out();
        self.cache.clear_current_user_id();
        self.events.publish(NetworkEvent::Logout);

        if let Some(social) = &self.social {
            social.logout();
        }

        if let Some(hooks) = &self.hooks {
            let payload = user.map(HookPayload::with_user).unwrap_or_default();
            hooks
                .execute(HookEvent::DidLogout, payload)
                .await
                .map_err(AuthError::hook(HookEvent::DidLogout))?;
        }

        tracing::info!("logged out");
        Ok(())
    }
}
