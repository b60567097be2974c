//! Local user records and the persisted current-user id.

use std::collections::HashMap;

use authforge_protocol::{EntityId, LocalUser};
use parking_lot::Mutex;

/// The local persistence layer for user records.
///
/// Records are looked up by [`EntityId`] only; the orchestrator never
/// iterates or deletes them. The cache also persists which user is the
/// current one (the "login info"), so other modules can resolve the
/// current user and logout knows whom to tear down.
pub trait UserCache: Send + Sync + 'static {
    fn fetch_by_entity_id(&self, id: &EntityId) -> Option<LocalUser>;

    /// Inserts or replaces the record for `user.entity_id`.
    fn save(&self, user: &LocalUser);

    fn current_user_id(&self) -> Option<EntityId>;

    fn set_current_user_id(&self, id: &EntityId);

    fn clear_current_user_id(&self);
}

#[derive(Debug, Default)]
struct CacheState {
    users: HashMap<EntityId, LocalUser>,
    current: Option<EntityId>,
}

/// A [`UserCache`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryUserCache {
    state: Mutex<CacheState>,
}

impl MemoryUserCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.state.lock().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl UserCache for MemoryUserCache {
    fn fetch_by_entity_id(&self, id: &EntityId) -> Option<LocalUser> {
        self.state.lock().users.get(id).cloned()
    }

    fn save(&self, user: &LocalUser) {
        self.state
            .lock()
            .users
            .insert(user.entity_id.clone(), user.clone());
        tracing::trace!(entity_id = %user.entity_id, "local user saved");
    }

    fn current_user_id(&self) -> Option<EntityId> {
        self.state.lock().current.clone()
    }

    fn set_current_user_id(&self, id: &EntityId) {
        self.state.lock().current = Some(id.clone());
    }

    fn clear_current_user_id(&self) {
        self.state.lock().current = None;
    }
}
