//! In-process lifecycle hooks.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use authforge_gateway::{BoxFuture, HookDispatcher, ServiceError};
use authforge_protocol::{HookEvent, HookPayload};
use futures_util::FutureExt;
use parking_lot::RwLock;

/// A registered hook handler.
pub type HookHandler =
    Arc<dyn Fn(HookPayload) -> BoxFuture<'static, Result<(), ServiceError>> + Send + Sync>;

/// A [`HookDispatcher`] that runs async closures registered in-process.
///
/// Handlers for a hook run one after another in registration order. The
/// first failing handler stops the chain and its error is returned; the
/// remaining handlers don't run. Executing a hook with no handlers
/// succeeds.
#[derive(Default)]
pub struct HookRegistry {
    handlers: RwLock<HashMap<HookEvent, Vec<HookHandler>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handler` to the end of `hook`'s chain.
    pub fn register<F, Fut>(&self, hook: HookEvent, handler: F)
    where
        F: Fn(HookPayload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
    {
        let handler: HookHandler = Arc::new(move |payload| handler(payload).boxed());
        self.handlers.write().entry(hook).or_default().push(handler);
        tracing::debug!(%hook, "hook handler registered");
    }

    pub fn handler_count(&self, hook: HookEvent) -> usize {
        self.handlers.read().get(&hook).map_or(0, Vec::len)
    }
}

impl HookDispatcher for HookRegistry {
    fn execute(
        &self,
        hook: HookEvent,
        payload: HookPayload,
    ) -> BoxFuture<'_, Result<(), ServiceError>> {
        // Snapshot the chain so the lock isn't held across handler awaits.
        let chain: Vec<HookHandler> = self
            .handlers
            .read()
            .get(&hook)
            .cloned()
            .unwrap_or_default();

        Box::pin(async move {
            tracing::debug!(%hook, handlers = chain.len(), "executing hook");
            for handler in chain {
                handler(payload.clone()).await?;
            }
            Ok(())
        })
    }
}
