//! Recording collaborators shared by the integration tests.
//!
//! Every mock writes what it was asked to do into one [`Journal`], so a
//! test can assert the order of steps across collaborators. Mocks can be
//! told to fail, and the provider and profile store can be held on a
//! [`Notify`] gate to keep an attempt in flight.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use authforge::prelude::*;
use authforge_gateway::{BoxFuture, SignInResult};
use authforge_protocol::PasswordChange;
use parking_lot::Mutex;
use tokio::sync::Notify;

// =========================================================================
// Journal
// =========================================================================

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().iter().filter(|e| *e == entry).count()
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == entry)
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

// =========================================================================
// Identity provider
// =========================================================================

pub struct MockProvider {
    journal: Journal,
    pub identity: ProviderIdentity,
    current: Mutex<Option<ProviderIdentity>>,
    failure: Mutex<Option<ProviderError>>,
    gate: Mutex<Option<Arc<Notify>>>,
    panic_on_sign_in: AtomicBool,
    sign_outs: AtomicUsize,
    password_changes: Mutex<Vec<PasswordChange>>,
    reset_mails: Mutex<Vec<String>>,
}

impl MockProvider {
    fn new(journal: Journal) -> Self {
        Self {
            journal,
            identity: ProviderIdentity::new("u1")
                .with_email("ada@example.com")
                .with_display_name("Ada"),
            current: Mutex::new(None),
            failure: Mutex::new(None),
            gate: Mutex::new(None),
            panic_on_sign_in: AtomicBool::new(false),
            sign_outs: AtomicUsize::new(0),
            password_changes: Mutex::new(Vec::new()),
            reset_mails: Mutex::new(Vec::new()),
        }
    }

    /// Makes the provider remember a signed-in identity.
    pub fn sign_in_silently(&self) {
        *self.current.lock() = Some(self.identity.clone());
    }

    pub fn fail_with(&self, error: ProviderError) {
        *self.failure.lock() = Some(error);
    }

    /// Holds every sign-in until the returned gate is notified.
    pub fn gate(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn panic_on_sign_in(&self) {
        self.panic_on_sign_in.store(true, Ordering::SeqCst);
    }

    pub fn sign_outs(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    pub fn password_changes(&self) -> Vec<PasswordChange> {
        self.password_changes.lock().clone()
    }

    pub fn reset_mails(&self) -> Vec<String> {
        self.reset_mails.lock().clone()
    }

    fn sign_in(&self, call: &'static str) -> BoxFuture<'_, SignInResult> {
        let gate = self.gate.lock().clone();
        Box::pin(async move {
            self.journal.record(call);
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if self.panic_on_sign_in.load(Ordering::SeqCst) {
                panic!("provider blew up");
            }
            let failure = self.failure.lock().clone();
            if let Some(error) = failure {
                return Err(error);
            }
            *self.current.lock() = Some(self.identity.clone());
            Ok(self.identity.clone())
        })
    }
}

impl IdentityProvider for MockProvider {
    fn current_identity(&self) -> Option<ProviderIdentity> {
        self.current.lock().clone()
    }

    fn sign_in_with_email<'a>(
        &'a self,
        _email: &'a str,
        _password: &'a str,
    ) -> BoxFuture<'a, SignInResult> {
        self.sign_in("provider.sign_in_with_email")
    }

    fn create_user<'a>(
        &'a self,
        _email: &'a str,
        _password: &'a str,
    ) -> BoxFuture<'a, SignInResult> {
        self.sign_in("provider.create_user")
    }

    fn sign_in_anonymously(&self) -> BoxFuture<'_, SignInResult> {
        self.sign_in("provider.sign_in_anonymously")
    }

    fn sign_in_with_custom_token<'a>(&'a self, _token: &'a str) -> BoxFuture<'a, SignInResult> {
        self.sign_in("provider.sign_in_with_custom_token")
    }

    fn sign_out(&self) {
        self.journal.record("provider.sign_out");
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        *self.current.lock() = None;
    }

    fn update_password<'a>(
        &'a self,
        change: &'a PasswordChange,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            self.journal.record("provider.update_password");
            let failure = self.failure.lock().clone();
            if let Some(error) = failure {
                return Err(error);
            }
            self.password_changes.lock().push(change.clone());
            Ok(())
        })
    }

    fn send_password_reset<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<(), ProviderError>> {
        Box::pin(async move {
            self.journal.record("provider.send_password_reset");
            let failure = self.failure.lock().clone();
            if let Some(error) = failure {
                return Err(error);
            }
            self.reset_mails.lock().push(email.to_string());
            Ok(())
        })
    }
}

// =========================================================================
// User cache
// =========================================================================

/// A [`MemoryUserCache`] that journals writes.
pub struct JournalingCache {
    journal: Journal,
    pub store: MemoryUserCache,
}

impl UserCache for JournalingCache {
    fn fetch_by_entity_id(&self, id: &EntityId) -> Option<LocalUser> {
        self.store.fetch_by_entity_id(id)
    }

    fn save(&self, user: &LocalUser) {
        self.journal.record("cache.save");
        self.store.save(user);
    }

    fn current_user_id(&self) -> Option<EntityId> {
        self.store.current_user_id()
    }

    fn set_current_user_id(&self, id: &EntityId) {
        self.journal.record("cache.set_current");
        self.store.set_current_user_id(id);
    }

    fn clear_current_user_id(&self) {
        self.journal.record("cache.clear_current");
        self.store.clear_current_user_id();
    }
}

// =========================================================================
// Profile store
// =========================================================================

pub struct MockProfileStore {
    journal: Journal,
    remote: Mutex<ProfileData>,
    pushed: Mutex<Vec<LocalUser>>,
    fetch_failure: Mutex<Option<ServiceError>>,
    push_failure: Mutex<Option<ServiceError>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockProfileStore {
    fn new(journal: Journal) -> Self {
        Self {
            journal,
            remote: Mutex::new(ProfileData::new()),
            pushed: Mutex::new(Vec::new()),
            fetch_failure: Mutex::new(None),
            push_failure: Mutex::new(None),
            gate: Mutex::new(None),
        }
    }

    pub fn set_remote(&self, profile: ProfileData) {
        *self.remote.lock() = profile;
    }

    pub fn fail_fetch(&self, error: ServiceError) {
        *self.fetch_failure.lock() = Some(error);
    }

    pub fn fail_push(&self, error: ServiceError) {
        *self.push_failure.lock() = Some(error);
    }

    /// Holds every fetch until the returned gate is notified.
    pub fn gate(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn fetches(&self) -> usize {
        self.journal.count("profiles.fetch")
    }

    pub fn pushed(&self) -> Vec<LocalUser> {
        self.pushed.lock().clone()
    }
}

impl ProfileStore for MockProfileStore {
    fn fetch_once<'a>(
        &'a self,
        _user: &'a LocalUser,
    ) -> BoxFuture<'a, Result<ProfileData, ServiceError>> {
        let gate = self.gate.lock().clone();
        Box::pin(async move {
            self.journal.record("profiles.fetch");
            if let Some(gate) = gate {
                gate.notified().await;
            }
            let failure = self.fetch_failure.lock().clone();
            match failure {
                Some(error) => Err(error),
                None => Ok(self.remote.lock().clone()),
            }
        })
    }

    fn push<'a>(&'a self, user: &'a LocalUser) -> BoxFuture<'a, Result<(), ServiceError>> {
        Box::pin(async move {
            self.journal.record("profiles.push");
            let failure = self.push_failure.lock().clone();
            if let Some(error) = failure {
                return Err(error);
            }
            self.pushed.lock().push(user.clone());
            Ok(())
        })
    }
}

// =========================================================================
// Remote config
// =========================================================================

pub struct MockRemoteConfig {
    journal: Journal,
    value: Mutex<Option<ConfigMap>>,
    failure: Mutex<Option<ServiceError>>,
}

impl MockRemoteConfig {
    pub fn publish(&self, config: ConfigMap) {
        *self.value.lock() = Some(config);
    }

    pub fn fail_with(&self, error: ServiceError) {
        *self.failure.lock() = Some(error);
    }

    pub fn fetches(&self) -> usize {
        self.journal.count("remote_config.fetch")
    }
}

impl RemoteConfigStore for MockRemoteConfig {
    fn fetch_once(&self) -> BoxFuture<'_, Result<Option<ConfigMap>, ServiceError>> {
        Box::pin(async move {
            self.journal.record("remote_config.fetch");
            let failure = self.failure.lock().clone();
            match failure {
                Some(error) => Err(error),
                None => Ok(self.value.lock().clone()),
            }
        })
    }
}

// =========================================================================
// Hooks, presence, social login, bus, sink
// =========================================================================

pub struct MockHooks {
    journal: Journal,
    executed: Mutex<Vec<(HookEvent, Option<EntityId>)>>,
    failing: Mutex<HashSet<HookEvent>>,
}

impl MockHooks {
    pub fn fail(&self, hook: HookEvent) {
        self.failing.lock().insert(hook);
    }

    pub fn executed(&self) -> Vec<(HookEvent, Option<EntityId>)> {
        self.executed.lock().clone()
    }
}

impl HookDispatcher for MockHooks {
    fn execute(
        &self,
        hook: HookEvent,
        payload: HookPayload,
    ) -> BoxFuture<'_, Result<(), ServiceError>> {
        Box::pin(async move {
            self.journal.record(format!("hook.{hook}"));
            self.executed
                .lock()
                .push((hook, payload.user.map(|u| u.entity_id)));
            if self.failing.lock().contains(&hook) {
                return Err(ServiceError::Rejected(format!("{hook} refused")));
            }
            Ok(())
        })
    }
}

pub struct MockPresence {
    journal: Journal,
    online: AtomicBool,
    fail_online: AtomicBool,
    fail_offline: AtomicBool,
}

impl MockPresence {
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    pub fn fail_online(&self) {
        self.fail_online.store(true, Ordering::SeqCst);
    }

    pub fn fail_offline(&self) {
        self.fail_offline.store(true, Ordering::SeqCst);
    }
}

impl Presence for MockPresence {
    fn set_online(&self) -> BoxFuture<'_, Result<(), ServiceError>> {
        Box::pin(async move {
            self.journal.record("presence.set_online");
            if self.fail_online.load(Ordering::SeqCst) {
                return Err(ServiceError::Unavailable("presence down".into()));
            }
            self.online.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn set_offline(&self) -> BoxFuture<'_, Result<(), ServiceError>> {
        Box::pin(async move {
            self.journal.record("presence.set_offline");
            if self.fail_offline.load(Ordering::SeqCst) {
                return Err(ServiceError::Unavailable("presence down".into()));
            }
            self.online.store(false, Ordering::SeqCst);
            Ok(())
        })
    }
}

pub struct MockSocial {
    journal: Journal,
    enabled: Mutex<HashSet<AccountType>>,
}

impl MockSocial {
    pub fn enable(&self, account_type: AccountType) {
        self.enabled.lock().insert(account_type);
    }

    pub fn logouts(&self) -> usize {
        self.journal.count("social.logout")
    }
}

impl SocialLogin for MockSocial {
    fn logout(&self) {
        self.journal.record("social.logout");
    }

    fn account_type_enabled(&self, account_type: AccountType) -> bool {
        self.enabled.lock().contains(&account_type)
    }
}

pub struct RecordingBus {
    journal: Journal,
    events: Mutex<Vec<NetworkEvent>>,
}

impl RecordingBus {
    pub fn events(&self) -> Vec<NetworkEvent> {
        self.events.lock().clone()
    }
}

impl EventBus for RecordingBus {
    fn publish(&self, event: NetworkEvent) {
        let entry = match &event {
            NetworkEvent::UserContextActivated(_) => "bus.activated",
            NetworkEvent::UserContextDeactivated(_) => "bus.deactivated",
            NetworkEvent::Logout => "bus.logout",
        };
        self.journal.record(entry);
        self.events.lock().push(event);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    reports: Mutex<Vec<(&'static str, String)>>,
}

impl RecordingSink {
    pub fn reports(&self) -> Vec<(&'static str, String)> {
        self.reports.lock().clone()
    }

    pub fn tasks(&self) -> Vec<&'static str> {
        self.reports.lock().iter().map(|(task, _)| *task).collect()
    }
}

impl ErrorSink for RecordingSink {
    fn report(&self, task: &'static str, error: &AuthError) {
        self.reports.lock().push((task, error.to_string()));
    }
}

// =========================================================================
// Harness
// =========================================================================

pub struct Harness {
    pub journal: Journal,
    pub provider: Arc<MockProvider>,
    pub cache: Arc<JournalingCache>,
    pub profiles: Arc<MockProfileStore>,
    pub remote: Arc<MockRemoteConfig>,
    pub bus: Arc<RecordingBus>,
    pub presence: Arc<MockPresence>,
    pub hooks: Arc<MockHooks>,
    pub social: Arc<MockSocial>,
    pub sink: Arc<RecordingSink>,
}

impl Harness {
    pub fn new() -> Self {
        let journal = Journal::default();
        Self {
            provider: Arc::new(MockProvider::new(journal.clone())),
            cache: Arc::new(JournalingCache {
                journal: journal.clone(),
                store: MemoryUserCache::new(),
            }),
            profiles: Arc::new(MockProfileStore::new(journal.clone())),
            remote: Arc::new(MockRemoteConfig {
                journal: journal.clone(),
                value: Mutex::new(None),
                failure: Mutex::new(None),
            }),
            bus: Arc::new(RecordingBus {
                journal: journal.clone(),
                events: Mutex::new(Vec::new()),
            }),
            presence: Arc::new(MockPresence {
                journal: journal.clone(),
                online: AtomicBool::new(false),
                fail_online: AtomicBool::new(false),
                fail_offline: AtomicBool::new(false),
            }),
            hooks: Arc::new(MockHooks {
                journal: journal.clone(),
                executed: Mutex::new(Vec::new()),
                failing: Mutex::new(HashSet::new()),
            }),
            social: Arc::new(MockSocial {
                journal: journal.clone(),
                enabled: Mutex::new(HashSet::new()),
            }),
            sink: Arc::new(RecordingSink::default()),
            journal,
        }
    }

    /// The seeded identity's uid.
    pub fn uid(&self) -> EntityId {
        self.provider.identity.uid.clone()
    }

    /// A handler wired to every mock, hooks and social login included.
    pub fn handler(&self, config: AuthConfig) -> AuthenticationHandler {
        self.required(config)
            .hook_dispatcher(self.hooks.clone())
            .social_login(self.social.clone())
            .build()
            .unwrap()
    }

    /// A handler without the optional hook dispatcher and social login.
    pub fn bare_handler(&self, config: AuthConfig) -> AuthenticationHandler {
        self.required(config).build().unwrap()
    }

    fn required(&self, config: AuthConfig) -> AuthenticationHandlerBuilder {
        AuthenticationHandler::builder()
            .config(config)
            .identity_provider(self.provider.clone())
            .user_cache(self.cache.clone())
            .profile_store(self.profiles.clone())
            .remote_config_store(self.remote.clone())
            .event_bus(self.bus.clone())
            .presence(self.presence.clone())
            .error_sink(self.sink.clone())
    }
}

pub fn dev_mode() -> AuthConfig {
    AuthConfig {
        development_mode_enabled: true,
        ..AuthConfig::default()
    }
}

/// Lets detached tasks run to completion.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

/// Waits until `condition` holds, failing the test after a second.
pub async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}
