//! Shared types for Authforge.
//!
//! This crate defines the vocabulary every other layer speaks:
//!
//! - **Identity** ([`EntityId`], [`ProviderIdentity`], [`LocalUser`]) -
//!   who a user is, as seen by the identity provider and by this system.
//! - **Credentials** ([`AccountDetails`], [`AccountType`]) - how a user
//!   asks to be let in.
//! - **Notifications** ([`NetworkEvent`], [`HookEvent`], [`HookPayload`]) -
//!   what the orchestrator tells the rest of the application.
//! - **Profile codec** - how a [`LocalUser`] maps to and from the
//!   key/value document kept by the remote profile store.
//!
//! # Architecture
//!
//! ```text
//! Gateway (collaborators) → Protocol (shared types) ← Session (status, cache)
//!                                  ↑
//!                        Orchestrator (authforge)
//! ```
//!
//! Nothing here performs I/O.

mod codec;
mod error;
mod types;

pub use error::ProtocolError;
pub use types::{
    AccountDetails, AccountType, ConfigMap, EntityId, FederatedProvider,
    HookEvent, HookPayload, LocalUser, NetworkEvent, PasswordChange,
    ProfileData, ProviderIdentity,
};
