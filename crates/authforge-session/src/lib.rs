//! Session state for Authforge.
//!
//! This crate owns the little bit of mutable state the orchestrator needs
//! across calls:
//!
//! 1. **Status** - which phase of authentication is running
//!    ([`SessionStatus`]), and the single-flight guard that makes sure
//!    only one attempt runs at a time ([`StatusCell`], [`AuthAttempt`])
//! 2. **Flags** - whether this process has authenticated anyone yet
//!    ([`SessionFlags`])
//! 3. **Local users** - the cached user records and the persisted
//!    "current user" id ([`UserCache`], [`MemoryUserCache`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Orchestrator (above)  ← checks status, reads/writes the cache
//!     ↕
//! Session Layer (this crate)  ← status, flags, local user records
//!     ↕
//! Protocol Layer (below)  ← EntityId, LocalUser
//! ```

mod cache;
mod error;
mod guard;
mod session;

pub use cache::{MemoryUserCache, UserCache};
pub use error::SessionError;
pub use guard::{AuthAttempt, StatusCell};
pub use session::{SessionFlags, SessionStatus};
