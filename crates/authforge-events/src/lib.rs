//! Notification sinks for Authforge.
//!
//! The orchestrator announces what happened in two ways:
//!
//! - [`EventBus`] - broadcast, domain-wide notifications such as "user
//!   context activated" or "logged out". Publishing never blocks and never
//!   fails; nobody listening is fine.
//! - Lifecycle hooks - named points (`WillLogout`, `DidLogout`,
//!   `DidAuthenticate`) where other modules run their own async code.
//!   [`HookRegistry`] is an in-process
//!   [`HookDispatcher`](authforge_gateway::HookDispatcher).
//!
//! # Key types
//!
//! - [`EventBus`] - the trait the orchestrator publishes to
//! - [`BroadcastEventBus`] - a `tokio::sync::broadcast` implementation
//! - [`HookRegistry`] - register async handlers per [`HookEvent`](authforge_protocol::HookEvent)

mod bus;
mod hooks;

pub use bus::{BroadcastEventBus, EventBus};
pub use hooks::{HookHandler, HookRegistry};
