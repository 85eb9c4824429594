//! Per-user navigation sessions (stateful strategy only).
//!
//! The stateless strategy keeps everything in the action token and never
//! touches this module.
//!
//! ## Concurrency
//!
//! Two rapid taps by the same user must not interleave a read and a write and
//! silently undo progress. `SessionStore::update` is the only read-modify-write
//! entry point and implementations must make it atomic per user.

mod memory;

pub use memory::{MemorySessionStore, SessionLimits};

use async_trait::async_trait;

use crate::navigation::NavigationState;

/// Opaque user identity from the chat transport
pub type UserId = i64;

/// Read-modify-write step applied under the store's lock
pub type SessionUpdate<'a> =
    &'a mut (dyn FnMut(Option<&NavigationState>) -> NavigationState + Send);

/// Persistence for per-user navigation state
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Current state, or `None` if the user has no live session
    async fn get(&self, user: UserId) -> Option<NavigationState>;

    /// Overwrite the user's state
    async fn set(&self, user: UserId, state: NavigationState);

    /// Atomically replace the user's state with `apply(prior)`.
    /// Returns the state that was stored.
    async fn update(&self, user: UserId, apply: SessionUpdate<'_>) -> NavigationState;

    async fn remove(&self, user: UserId) -> Option<NavigationState>;

    /// Number of live sessions
    async fn len(&self) -> usize;
}
