//! # Authforge
//!
//! Coordinates sign-in, sign-up and sign-out against an external identity
//! provider, and sequences everything that has to happen afterwards.
//!
//! The application implements (or picks in-memory versions of) the
//! collaborator traits from `authforge-gateway`, `authforge-session` and
//! `authforge-events`, hands them to [`AuthenticationHandler::builder`],
//! and calls the handler's operations.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use authforge::prelude::*;
//!
//! # async fn run() -> Result<(), AuthError> {
//! let handler = AuthenticationHandler::builder()
//!     .identity_provider(Arc::new(MemoryIdentityProvider::new()))
//!     .user_cache(Arc::new(MemoryUserCache::new()))
//!     .profile_store(Arc::new(MemoryProfileStore::new()))
//!     .event_bus(Arc::new(BroadcastEventBus::new()))
//!     .presence(Arc::new(MemoryPresence::new()))
//!     .build()?;
//!
//! handler
//!     .authenticate_with(AccountDetails::register("ada@example.com", "secret1"))
//!     .await?;
//! handler.logout().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - `authenticate`, `authenticate_with` and `logout` are single-flight:
//!   while one runs, the others fail at once with
//!   [`AuthError::AuthInProgress`].
//! - The session status is back to `Idle` after every one of them,
//!   whatever the outcome.
//! - Side effects after authentication (hooks, presence, profile push)
//!   never fail the authentication; their errors go to the configured
//!   [`ErrorSink`].

mod builder;
mod config;
mod detach;
mod error;
mod handler;
mod pipeline;

pub use builder::AuthenticationHandlerBuilder;
pub use config::{AuthConfig, SharedConfig};
pub use detach::{ErrorSink, TracingErrorSink, detach};
pub use error::AuthError;
pub use handler::AuthenticationHandler;

pub mod prelude {
    pub use crate::{
        AuthConfig, AuthError, AuthenticationHandler,
        AuthenticationHandlerBuilder, ErrorSink, SharedConfig,
        TracingErrorSink,
    };
    pub use authforge_events::{BroadcastEventBus, EventBus, HookRegistry};
    pub use authforge_gateway::{
        HookDispatcher, IdentityProvider, MemoryIdentityProvider,
        MemoryPresence, MemoryProfileStore, MemoryRemoteConfig, Presence,
        ProfileStore, ProviderError, RemoteConfigStore, ServiceError,
        SocialLogin,
    };
    pub use authforge_protocol::{
        AccountDetails, AccountType, ConfigMap, EntityId, FederatedProvider,
        HookEvent, HookPayload, LocalUser, NetworkEvent, ProfileData,
        ProviderIdentity,
    };
    pub use authforge_session::{
        MemoryUserCache, SessionStatus, UserCache,
    };
}
