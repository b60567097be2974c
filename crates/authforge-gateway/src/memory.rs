//! In-memory collaborators.
//!
//! Enough behavior to run the orchestrator end to end without a backend:
//! accounts live in a `HashMap`, profiles in another, presence is a flag.
//! Used by the demo binary and by tests; not meant for production.

use std::collections::HashMap;

use authforge_protocol::{
    ConfigMap, EntityId, LocalUser, PasswordChange, ProfileData,
    ProviderIdentity,
};
use parking_lot::Mutex;
use rand::Rng;

use crate::{
    BoxFuture, IdentityProvider, Presence, ProfileStore, ProviderError,
    RemoteConfigStore, ServiceError, SignInResult,
};

/// Shortest password [`MemoryIdentityProvider`] accepts on registration.
const MIN_PASSWORD_LEN: usize = 6;

// ---------------------------------------------------------------------------
// MemoryIdentityProvider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Account {
    uid: EntityId,
    password: String,
}

#[derive(Debug, Default)]
struct ProviderState {
    /// Email/password accounts, keyed by email.
    accounts: HashMap<String, Account>,
    /// Custom tokens the "backend" has minted, mapped to their uid.
    custom_tokens: HashMap<String, EntityId>,
    current: Option<ProviderIdentity>,
    reset_requests: Vec<String>,
}

/// An identity provider that keeps its accounts in memory.
pub struct MemoryIdentityProvider {
    state: Mutex<ProviderState>,
    anonymous_enabled: bool,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProviderState::default()),
            anonymous_enabled: true,
        }
    }

    /// Switches anonymous sign-in off on the "provider side".
    pub fn without_anonymous(mut self) -> Self {
        self.anonymous_enabled = false;
        self
    }

    /// Pre-registers an email/password account and returns its uid.
    pub fn add_account(&self, email: &str, password: &str) -> EntityId {
        let uid = generate_uid();
        self.state.lock().accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
            },
        );
        uid
    }

    /// Mints a custom token that signs in as `uid`.
    pub fn add_custom_token(&self, token: &str, uid: impl Into<EntityId>) {
        self.state
            .lock()
            .custom_tokens
            .insert(token.to_string(), uid.into());
    }

    /// Emails that asked for a password reset, oldest first.
    pub fn reset_requests(&self) -> Vec<String> {
        self.state.lock().reset_requests.clone()
    }

    fn sign_in_as(&self, identity: ProviderIdentity) -> ProviderIdentity {
        tracing::debug!(uid = %identity.uid, "memory provider signed in");
        self.state.lock().current = Some(identity.clone());
        identity
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for MemoryIdentityProvider {
    fn current_identity(&self) -> Option<ProviderIdentity> {
        self.state.lock().current.clone()
    }

    fn sign_in_with_email<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, SignInResult> {
        Box::pin(async move {
            let account = self
                .state
                .lock()
                .accounts
                .get(email)
                .cloned()
                .ok_or(ProviderError::UserNotFound)?;
            if account.password != password {
                return Err(ProviderError::InvalidCredentials);
            }
            Ok(self.sign_in_as(ProviderIdentity::new(account.uid).with_email(email)))
        })
    }

    fn create_user<'a>(
        &'a self,
        email: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, SignInResult> {
        Box::pin(async move {
            if password.len() < MIN_PASSWORD_LEN {
                return Err(ProviderError::WeakPassword(format!(
                    "at least {MIN_PASSWORD_LEN} characters required"
                )));
            }
            if self.state.lock().accounts.contains_key(email) {
                return Err(ProviderError::EmailAlreadyInUse);
            }
            let uid = self.add_account(email, password);
            Ok(self.sign_in_as(ProviderIdentity::new(uid).with_email(email)))
        })
    }

    fn sign_in_anonymously(&self) -> BoxFuture<'_, SignInResult> {
        Box::pin(async move {
            if !self.anonymous_enabled {
                return Err(ProviderError::OperationNotAllowed(
                    "anonymous sign-in is disabled".into(),
                ));
            }
            Ok(self.sign_in_as(ProviderIdentity::new(generate_uid()).anonymous()))
        })
    }

    fn sign_in_with_custom_token<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, SignInResult> {
        Box::pin(async move {
            let uid = self
                .state
                .lock()
                .custom_tokens
                .get(token)
                .cloned()
                .ok_or(ProviderError::InvalidCustomToken)?;
            Ok(self.sign_in_as(ProviderIdentity::new(uid)))
        })
    }

    fn sign_out(&self) {
        self.state.lock().current = None;
    }

    fn update_password<'a>(
        &'a self,
        change: &'a PasswordChange,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            let current = state.current.clone().ok_or(ProviderError::NotSignedIn)?;
            if change.new_password.len() < MIN_PASSWORD_LEN {
                return Err(ProviderError::WeakPassword(format!(
                    "at least {MIN_PASSWORD_LEN} characters required"
                )));
            }
            let account = state
                .accounts
                .values_mut()
                .find(|account| account.uid == current.uid)
                .ok_or_else(|| {
                    ProviderError::OperationNotAllowed(
                        "current user has no password".into(),
                    )
                })?;
            account.password = change.new_password.clone();
            Ok(())
        })
    }

    fn send_password_reset<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if !state.accounts.contains_key(email) {
                return Err(ProviderError::UserNotFound);
            }
            state.reset_requests.push(email.to_string());
            Ok(())
        })
    }
}

/// A random 28-character hex uid, the same length Firebase uses.
fn generate_uid() -> EntityId {
    let bytes: [u8; 14] = rand::rng().random();
    EntityId::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
}

// ---------------------------------------------------------------------------
// MemoryProfileStore
// ---------------------------------------------------------------------------

/// Profiles kept in a map, keyed by entity id.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<EntityId, ProfileData>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a remote profile, as if another device had published it.
    pub fn insert(&self, id: impl Into<EntityId>, profile: ProfileData) {
        self.profiles.lock().insert(id.into(), profile);
    }

    pub fn get(&self, id: &EntityId) -> Option<ProfileData> {
        self.profiles.lock().get(id).cloned()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn fetch_once<'a>(
        &'a self,
        user: &'a LocalUser,
    ) -> BoxFuture<'a, Result<ProfileData, ServiceError>> {
        Box::pin(async move {
            Ok(self
                .profiles
                .lock()
                .get(&user.entity_id)
                .cloned()
                .unwrap_or_default())
        })
    }

    fn push<'a>(
        &'a self,
        user: &'a LocalUser,
    ) -> BoxFuture<'a, Result<(), ServiceError>> {
        Box::pin(async move {
            let profile = user
                .to_profile()
                .map_err(|e| ServiceError::Rejected(e.to_string()))?;
            self.profiles.lock().insert(user.entity_id.clone(), profile);
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryRemoteConfig
// ---------------------------------------------------------------------------

/// A remote config store holding at most one document.
#[derive(Default)]
pub struct MemoryRemoteConfig {
    value: Mutex<Option<ConfigMap>>,
}

impl MemoryRemoteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `config` as the remote document.
    pub fn publish(&self, config: ConfigMap) {
        *self.value.lock() = Some(config);
    }
}

impl RemoteConfigStore for MemoryRemoteConfig {
    fn fetch_once(&self) -> BoxFuture<'_, Result<Option<ConfigMap>, ServiceError>> {
        Box::pin(async move { Ok(self.value.lock().clone()) })
    }
}

// ---------------------------------------------------------------------------
// MemoryPresence
// ---------------------------------------------------------------------------

/// Presence as a single online flag.
#[derive(Default)]
pub struct MemoryPresence {
    online: Mutex<bool>,
}

impl MemoryPresence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_online(&self) -> bool {
        *self.online.lock()
    }
}

impl Presence for MemoryPresence {
    fn set_online(&self) -> BoxFuture<'_, Result<(), ServiceError>> {
        Box::pin(async move {
            *self.online.lock() = true;
            Ok(())
        })
    }

    fn set_offline(&self) -> BoxFuture<'_, Result<(), ServiceError>> {
        Box::pin(async move {
            *self.online.lock() = false;
            Ok(())
        })
    }
}
