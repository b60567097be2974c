//! Core types shared by every Authforge layer.
//!
//! These are plain data: no I/O, no locking. The orchestrator moves them
//! between collaborators (identity provider → cache → profile store →
//! event bus) and the collaborators only ever see these shapes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A key/value document as stored by the remote profile store.
///
/// An empty map means "this user has never published a profile".
pub type ProfileData = serde_json::Map<String, serde_json::Value>;

/// A key/value document read from the remote configuration store.
pub type ConfigMap = serde_json::Map<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The identifier the identity provider assigned to a user.
///
/// This is a newtype over `String` so an entity id can't be confused with
/// an email address or a display name in a function signature. Local user
/// records are keyed by it.
///
/// `#[serde(transparent)]` serializes it as the bare string.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Wraps a provider-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// What the identity provider hands back after a successful sign-in.
///
/// Only the `uid` is guaranteed. The display fields are whatever the
/// provider happens to know (an anonymous user has none of them). This
/// value is never persisted as-is; it only seeds a [`LocalUser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    /// Provider-assigned identifier.
    pub uid: EntityId,
    /// Display name, if the provider has one.
    pub display_name: Option<String>,
    /// Email address, if the provider has one.
    pub email: Option<String>,
    /// Avatar url, if the provider has one.
    pub photo_url: Option<String>,
    /// `true` for identities created by anonymous sign-in.
    pub anonymous: bool,
}

impl ProviderIdentity {
    /// Creates an identity that carries nothing but its id.
    pub fn new(uid: impl Into<EntityId>) -> Self {
        Self {
            uid: uid.into(),
            display_name: None,
            email: None,
            photo_url: None,
            anonymous: false,
        }
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Sets the avatar url.
    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    /// Marks the identity as anonymous.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// This system's persisted record of an authenticated user.
///
/// Created the first time an identity authenticates and updated every
/// time it authenticates again. The orchestrator never deletes one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUser {
    /// Same id the identity provider uses.
    pub entity_id: EntityId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    /// Free-form profile fields (status line, locale, ...).
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl LocalUser {
    /// An empty record for `entity_id`.
    pub fn new(entity_id: impl Into<EntityId>) -> Self {
        Self {
            entity_id: entity_id.into(),
            name: None,
            email: None,
            avatar_url: None,
            meta: BTreeMap::new(),
        }
    }

    /// A fresh record seeded from the provider's display data.
    pub fn from_identity(identity: &ProviderIdentity) -> Self {
        let mut user = Self::new(identity.uid.clone());
        user.apply_identity(identity);
        user
    }

    /// Copies whatever display data the provider has onto this record.
    ///
    /// Fields the provider doesn't know are left untouched, so a cached
    /// name survives a sign-in through a provider that has no name.
    pub fn apply_identity(&mut self, identity: &ProviderIdentity) {
        if let Some(name) = &identity.display_name {
            self.name = Some(name.clone());
        }
        if let Some(email) = &identity.email {
            self.email = Some(email.clone());
        }
        if let Some(url) = &identity.photo_url {
            self.avatar_url = Some(url.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Social / federated login providers.
///
/// These are signed in by an external social-login module, never by the
/// orchestrator itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FederatedProvider {
    Facebook,
    Twitter,
    Google,
    Apple,
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Facebook => write!(f, "Facebook"),
            Self::Twitter => write!(f, "Twitter"),
            Self::Google => write!(f, "Google"),
            Self::Apple => write!(f, "Apple"),
        }
    }
}

/// The kind of login a caller is asking for, without the secrets.
///
/// Used for account-type gating ("is anonymous login switched on?") and
/// in error messages, where printing the full [`AccountDetails`] would
/// leak a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Username,
    Register,
    Anonymous,
    Custom,
    Federated(FederatedProvider),
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username => write!(f, "Username"),
            Self::Register => write!(f, "Register"),
            Self::Anonymous => write!(f, "Anonymous"),
            Self::Custom => write!(f, "Custom"),
            Self::Federated(provider) => write!(f, "Federated({provider})"),
        }
    }
}

/// Credentials for one login attempt.
///
/// This is a closed enum on purpose: the orchestrator `match`es on it
/// exhaustively, so adding a login mode is a compile error everywhere a
/// mode needs handling.
///
/// `Debug` is implemented by hand so passwords and tokens never end up
/// in logs.
#[derive(Clone, PartialEq, Eq)]
pub enum AccountDetails {
    /// Sign in to an existing account.
    UsernamePassword { username: String, password: String },
    /// Create an account, then sign in to it.
    Register { username: String, password: String },
    /// Sign in without credentials.
    Anonymous,
    /// Sign in with a token minted by the application's own backend.
    CustomToken { token: String },
    /// Social login. Not handled by the orchestrator.
    Federated { provider: FederatedProvider },
}

impl AccountDetails {
    pub fn username(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::UsernamePassword {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn register(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Register {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn custom(token: impl Into<String>) -> Self {
        Self::CustomToken {
            token: token.into(),
        }
    }

    /// The payload-free tag of these credentials.
    pub fn account_type(&self) -> AccountType {
        match self {
            Self::UsernamePassword { .. } => AccountType::Username,
            Self::Register { .. } => AccountType::Register,
            Self::Anonymous => AccountType::Anonymous,
            Self::CustomToken { .. } => AccountType::Custom,
            Self::Federated { provider } => AccountType::Federated(*provider),
        }
    }
}

impl fmt::Debug for AccountDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Register { username, .. } => f
                .debug_struct("Register")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Anonymous => write!(f, "Anonymous"),
            Self::CustomToken { .. } => {
                f.debug_struct("CustomToken").finish_non_exhaustive()
            }
            Self::Federated { provider } => f
                .debug_struct("Federated")
                .field("provider", provider)
                .finish(),
        }
    }
}

/// A password change request forwarded to the identity provider.
///
/// Providers that demand recent re-authentication can use `email` and
/// `old_password`; the rest only look at `new_password`.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub email: String,
    pub old_password: String,
    pub new_password: String,
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChange")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Domain-wide notifications published on the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkEvent {
    /// A user is now the current user; listeners for that user's data
    /// (threads, contacts, ...) should start.
    UserContextActivated(EntityId),
    /// The current user is going away; stop those listeners.
    UserContextDeactivated(EntityId),
    /// The session ended.
    Logout,
}

/// Lifecycle points other modules can hook into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookEvent {
    /// Runs before logout starts tearing anything down. Awaited.
    WillLogout,
    /// Runs after logout finished. Awaited.
    DidLogout,
    /// Runs after authentication was committed. Fire-and-forget.
    DidAuthenticate,
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WillLogout => write!(f, "WillLogout"),
            Self::DidLogout => write!(f, "DidLogout"),
            Self::DidAuthenticate => write!(f, "DidAuthenticate"),
        }
    }
}

/// Data handed to a hook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookPayload {
    /// The user the hook is about, when there is one.
    pub user: Option<LocalUser>,
}

impl HookPayload {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_user(user: LocalUser) -> Self {
        Self { user: Some(user) }
    }
}
