//! In-process session store with bounded capacity and idle expiry.
//!
//! All operations take one async mutex, which also serializes same-user
//! updates. Least-recently-used sessions are evicted when the store is full;
//! sessions idle for longer than the TTL read as absent.

use std::num::NonZeroUsize;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{SessionStore, SessionUpdate, UserId};
use crate::navigation::NavigationState;

/// Bounds for the in-memory store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Maximum number of sessions kept
    pub capacity: NonZeroUsize,
    /// Sessions untouched for this long are dropped
    pub idle_ttl: Duration,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(10_000).unwrap_or(NonZeroUsize::MIN),
            idle_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

#[derive(Debug)]
struct Entry {
    state: NavigationState,
    touched: Instant,
}

pub struct MemorySessionStore {
    entries: Mutex<LruCache<UserId, Entry>>,
    idle_ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(limits: SessionLimits) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(limits.capacity)),
            idle_ttl: limits.idle_ttl,
        }
    }

    /// Drop every expired session. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut cache = self.entries.lock().await;
        let now = Instant::now();
        let expired: Vec<UserId> = cache
            .iter()
            .filter(|(_, entry)| self.is_expired(entry, now))
            .map(|(user, _)| *user)
            .collect();
        for user in &expired {
            cache.pop(user);
        }
        expired.len()
    }

    fn is_expired(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.touched) >= self.idle_ttl
    }

    /// Live state for `user`, touching it. Expired sessions are removed.
    fn take_live(
        &self,
        cache: &mut LruCache<UserId, Entry>,
        user: UserId,
        now: Instant,
    ) -> Option<NavigationState> {
        let expired = self.is_expired(cache.peek(&user)?, now);
        if expired {
            cache.pop(&user);
            tracing::debug!(user, "Session expired");
            return None;
        }
        cache.get_mut(&user).map(|entry| {
            entry.touched = now;
            entry.state.clone()
        })
    }

    fn store(cache: &mut LruCache<UserId, Entry>, user: UserId, state: NavigationState, now: Instant) {
        let entry = Entry {
            state,
            touched: now,
        };
        if let Some((evicted, _)) = cache.push(user, entry) {
            if evicted != user {
                tracing::debug!(user = evicted, "Evicted least recently used session");
            }
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(SessionLimits::default())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, user: UserId) -> Option<NavigationState> {
        let mut cache = self.entries.lock().await;
        self.take_live(&mut cache, user, Instant::now())
    }

    async fn set(&self, user: UserId, state: NavigationState) {
        let mut cache = self.entries.lock().await;
        Self::store(&mut cache, user, state, Instant::now());
    }

    async fn update(&self, user: UserId, apply: SessionUpdate<'_>) -> NavigationState {
        let mut cache = self.entries.lock().await;
        let now = Instant::now();
        let prior = self.take_live(&mut cache, user, now);
        let next = apply(prior.as_ref());
        Self::store(&mut cache, user, next.clone(), now);
        next
    }

    async fn remove(&self, user: UserId) -> Option<NavigationState> {
        let mut cache = self.entries.lock().await;
        cache.pop(&user).map(|entry| entry.state)
    }

    async fn len(&self) -> usize {
        let cache = self.entries.lock().await;
        let now = Instant::now();
        cache
            .iter()
            .filter(|(_, entry)| !self.is_expired(entry, now))
            .count()
    }
}
