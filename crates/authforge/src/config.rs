//! Orchestrator configuration.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use authforge_protocol::ConfigMap;

/// Static settings, fixed when the handler is built.
///
/// Every field has a default, so a config file only needs to list what it
/// changes:
///
/// ```rust
/// use authforge::AuthConfig;
///
/// let config: AuthConfig =
///     serde_json::from_str(r#"{ "development_mode_enabled": true }"#).unwrap();
/// assert!(config.development_mode_enabled);
/// assert!(config.anonymous_login_enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Re-validate the first authentication of every run against the
    /// remote profile store, even when a cached user exists. Catches
    /// data wiped server-side while testing.
    pub development_mode_enabled: bool,

    /// Don't publish the local profile when a user authenticates and the
    /// remote store has nothing for them.
    pub disable_profile_update_on_authentication: bool,

    /// Fetch remote configuration after every authentication.
    pub remote_config_enabled: bool,

    /// Allow [`AccountType::Anonymous`](authforge_protocol::AccountType::Anonymous).
    pub anonymous_login_enabled: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            development_mode_enabled: false,
            disable_profile_update_on_authentication: false,
            remote_config_enabled: false,
            anonymous_login_enabled: true,
        }
    }
}

/// Process-wide configuration: the static [`AuthConfig`] plus whatever
/// remote configuration has been merged in since startup.
///
/// Read-mostly. Merges take a short write lock; readers never wait on I/O.
#[derive(Debug, Default)]
pub struct SharedConfig {
    settings: AuthConfig,
    remote: RwLock<ConfigMap>,
}

impl SharedConfig {
    pub fn new(settings: AuthConfig) -> Self {
        Self {
            settings,
            remote: RwLock::new(ConfigMap::new()),
        }
    }

    pub fn settings(&self) -> &AuthConfig {
        &self.settings
    }

    /// A remote configuration value, if one has been merged.
    pub fn remote_value(&self, key: &str) -> Option<Value> {
        self.remote.read().get(key).cloned()
    }

    /// A copy of all merged remote configuration.
    pub fn remote_snapshot(&self) -> ConfigMap {
        self.remote.read().clone()
    }

    /// Overlays `update` onto the remote configuration. Keys in `update`
    /// replace existing ones; other keys are kept.
    pub(crate) fn merge_remote(&self, update: ConfigMap) {
        let keys = update.len();
        self.remote.write().extend(update);
        tracing::debug!(keys, "remote config merged");
    }
}
