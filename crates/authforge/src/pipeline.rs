//! What happens once the identity provider has accepted someone.
//!
//! Both guarded authenticate operations end here with a
//! [`ProviderIdentity`]. From there:
//!
//! 1. If the local cache already has a trusted record for the identity,
//!    finalize straight away.
//! 2. Otherwise resolve the profile: fetch the remote profile once and
//!    merge it into the local record, finalize, and if the remote store
//!    had nothing, publish the local record in the background.
//! 3. Retrieve remote configuration. Failure here is reported, not
//!    returned.

use std::sync::Arc;

use authforge_protocol::{HookEvent, HookPayload, LocalUser, NetworkEvent, ProviderIdentity};
use authforge_session::{AuthAttempt, SessionStatus};

use crate::detach::detach;
use crate::handler::Inner;
use crate::AuthError;

/// Whether a cached record can be used without asking the profile store.
///
/// In development mode the first authentication of a run always goes to
/// the store, so data deleted server-side shows up locally.
pub(crate) fn is_cache_trusted(
    has_cached_user: bool,
    development_mode: bool,
    authenticated_this_session: bool,
) -> bool {
    has_cached_user && (!development_mode || authenticated_this_session)
}

impl Inner {
    pub(crate) async fn authenticate_with_identity(
        self: &Arc<Self>,
        attempt: &AuthAttempt,
        identity: ProviderIdentity,
    ) -> Result<(), AuthError> {
        let cached = self.cache.fetch_by_entity_id(&identity.uid);
        let trusted = is_cache_trusted(
            cached.is_some(),
            self.config.settings().development_mode_enabled,
            self.flags.authenticated_this_session(),
        );

        match cached {
            Some(user) if trusted => {
                tracing::debug!(user = %user.entity_id, "using cached user");
                self.complete_authentication(user);
            }
            cached => {
                attempt.advance(SessionStatus::ResolvingUserProfile);
                self.resolve_profile(cached, &identity).await?;
            }
        }

        if let Err(err) = self.retrieve_remote_config().await {
            tracing::warn!(error = %err, "continuing without remote config");
            self.errors.report("remote-config", &err);
        }
        Ok(())
    }

    async fn resolve_profile(
        self: &Arc<Self>,
        cached: Option<LocalUser>,
        identity: &ProviderIdentity,
    ) -> Result<(), AuthError> {
        let mut user = cached.unwrap_or_else(|| LocalUser::new(identity.uid.clone()));
        user.apply_identity(identity);

        let remote = self
            .profiles
            .fetch_once(&user)
            .await
            .map_err(AuthError::ProfileSync)?;
        let remote_is_empty = remote.is_empty();
        if !remote_is_empty {
            user.merge_profile(&remote)?;
        }
        tracing::debug!(user = %user.entity_id, remote_is_empty, "profile resolved");

        self.complete_authentication(user.clone());

        if remote_is_empty && !self.config.settings().disable_profile_update_on_authentication {
            let inner = Arc::clone(self);
            detach("profile-push", Arc::clone(&self.errors), async move {
                inner.profiles.push(&user).await.map_err(AuthError::ProfileSync)
            });
        }
        Ok(())
    }

    /// Makes `user` the current user and announces it.
    fn complete_authentication(self: &Arc<Self>, user: LocalUser) {
        self.cache.save(&user);
        self.cache.set_current_user_id(&user.entity_id);
        self.events
            .publish(NetworkEvent::UserContextActivated(user.entity_id.clone()));

        if let Some(hooks) = &self.hooks {
            let hooks = Arc::clone(hooks);
            let payload = HookPayload::with_user(user.clone());
            detach("did-authenticate-hook", Arc::clone(&self.errors), async move {
                hooks
                    .execute(HookEvent::DidAuthenticate, payload)
                    .await
                    .map_err(AuthError::hook(HookEvent::DidAuthenticate))
            });
        }

        let presence = Arc::clone(&self.presence);
        detach("set-online", Arc::clone(&self.errors), async move {
            presence.set_online().await.map_err(AuthError::Presence)
        });

        self.flags.mark_authenticated();
        tracing::info!(user = %user.entity_id, "authenticated");
    }

    pub(crate) async fn retrieve_remote_config(&self) -> Result<(), AuthError> {
        let Some(store) = self
            .remote_config
            .as_ref()
            .filter(|_| self.config.settings().remote_config_enabled)
        else {
            return Ok(());
        };

        match store.fetch_once().await.map_err(AuthError::RemoteConfig)? {
            Some(update) => self.config.merge_remote(update),
            None => tracing::debug!("no remote config published"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cache_trusted_truth_table() {
        // (cached, dev mode, authenticated this session) -> trusted
        let cases = [
            ((false, false, false), false),
            ((false, true, true), false),
            ((true, false, false), true),
            ((true, false, true), true),
            ((true, true, false), false),
            ((true, true, true), true),
        ];
        for ((cached, dev, authed), expected) in cases {
            assert_eq!(
                is_cache_trusted(cached, dev, authed),
                expected,
                "cached={cached} dev={dev} authed={authed}"
            );
        }
    }
}
