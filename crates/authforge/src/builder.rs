//! `AuthenticationHandler` builder.

use std::sync::Arc;

use authforge_events::EventBus;
use authforge_gateway::{
    HookDispatcher, IdentityProvider, Presence, ProfileStore,
    RemoteConfigStore, SocialLogin,
};
use authforge_session::{SessionFlags, StatusCell, UserCache};

use crate::handler::Inner;
use crate::{
    AuthConfig, AuthError, AuthenticationHandler, ErrorSink, SharedConfig,
    TracingErrorSink,
};

/// Builder for wiring an [`AuthenticationHandler`] to its collaborators.
///
/// The identity provider, user cache, profile store, event bus and
/// presence are required. A remote config store is required only when
/// [`AuthConfig::remote_config_enabled`] is set. Hooks and social login
/// are optional, and errors from background tasks go to a
/// [`TracingErrorSink`] unless another sink is given.
///
/// # Example
///
/// ```rust,ignore
/// use authforge::prelude::*;
///
/// let handler = AuthenticationHandler::builder()
///     .config(AuthConfig { remote_config_enabled: true, ..AuthConfig::default() })
///     .identity_provider(provider)
///     .user_cache(cache)
///     .profile_store(profiles)
///     .remote_config_store(remote)
///     .event_bus(bus)
///     .presence(presence)
///     .build()?;
/// ```
pub struct AuthenticationHandlerBuilder {
    config: AuthConfig,
    provider: Option<Arc<dyn IdentityProvider>>,
    cache: Option<Arc<dyn UserCache>>,
    profiles: Option<Arc<dyn ProfileStore>>,
    remote_config: Option<Arc<dyn RemoteConfigStore>>,
    events: Option<Arc<dyn EventBus>>,
    presence: Option<Arc<dyn Presence>>,
    hooks: Option<Arc<dyn HookDispatcher>>,
    social: Option<Arc<dyn SocialLogin>>,
    errors: Arc<dyn ErrorSink>,
}

impl AuthenticationHandlerBuilder {
    /// Creates a new builder with the default [`AuthConfig`].
    pub fn new() -> Self {
        Self {
            config: AuthConfig::default(),
            provider: None,
            cache: None,
            profiles: None,
            remote_config: None,
            events: None,
            presence: None,
            hooks: None,
            social: None,
            errors: Arc::new(TracingErrorSink),
        }
    }

    pub fn config(mut self, config: AuthConfig) -> Self {
        self.config = config;
        self
    }

    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn user_cache(mut self, cache: Arc<dyn UserCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn profile_store(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn remote_config_store(mut self, store: Arc<dyn RemoteConfigStore>) -> Self {
        self.remote_config = Some(store);
        self
    }

    pub fn event_bus(mut self, events: Arc<dyn EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn presence(mut self, presence: Arc<dyn Presence>) -> Self {
        self.presence = Some(presence);
        self
    }

    pub fn hook_dispatcher(mut self, hooks: Arc<dyn HookDispatcher>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn social_login(mut self, social: Arc<dyn SocialLogin>) -> Self {
        self.social = Some(social);
        self
    }

    /// Sets where errors from background tasks are reported.
    pub fn error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.errors = sink;
        self
    }

    /// Builds the handler. The session starts `Idle`.
    ///
    /// # Errors
    /// [`AuthError::MissingCollaborator`] naming the first required
    /// collaborator that wasn't set.
    pub fn build(self) -> Result<AuthenticationHandler, AuthError> {
        let provider = self
            .provider
            .ok_or(AuthError::MissingCollaborator("identity provider"))?;
        let cache = self.cache.ok_or(AuthError::MissingCollaborator("user cache"))?;
        let profiles = self
            .profiles
            .ok_or(AuthError::MissingCollaborator("profile store"))?;
        let events = self.events.ok_or(AuthError::MissingCollaborator("event bus"))?;
        let presence = self
            .presence
            .ok_or(AuthError::MissingCollaborator("presence"))?;
        if self.config.remote_config_enabled && self.remote_config.is_none() {
            return Err(AuthError::MissingCollaborator("remote config store"));
        }

        tracing::debug!(config = ?self.config, "authentication handler built");

        Ok(AuthenticationHandler::from_inner(Inner {
            config: SharedConfig::new(self.config),
            status: StatusCell::new(),
            flags: SessionFlags::new(),
            provider,
            cache,
            profiles,
            remote_config: self.remote_config,
            events,
            presence,
            hooks: self.hooks,
            social: self.social,
            errors: self.errors,
        }))
    }
}

impl Default for AuthenticationHandlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
