//! Time-based response cache
//!
//! Stores cloned values under `namespace:id` keys and forgets them once
//! their TTL elapses. Expiry is passive: stale entries are dropped when a
//! `get` touches them or when `purge_expired` sweeps the map.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::config::DEFAULT_CACHE_TTL;

/// Logical partition of the cache key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    Search,
    Details,
    Stream,
}

impl CacheNamespace {
    /// Key prefix used for this namespace.
    pub fn as_str(self) -> &'static str {
        match self {
            CacheNamespace::Search => "search",
            CacheNamespace::Details => "details",
            CacheNamespace::Stream => "stream",
        }
    }
}

impl fmt::Display for CacheNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached value with its expiry deadline.
///
/// A `None` deadline means the TTL reaches past what `Instant` can represent.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Key/value store with a fixed time-to-live per entry.
///
/// Safe to share behind an `Arc`; concurrent writers to the same key
/// resolve last-writer-wins.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Creates a cache with the default ten hour TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Creates a cache whose entries live for `ttl`.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Derives the storage key for a namespace and identifier.
    pub fn key(namespace: CacheNamespace, id: &str) -> String {
        format!("{}:{}", namespace.as_str(), id)
    }

    /// Stores `value`, replacing any previous entry under the same key.
    pub fn set(&self, namespace: CacheNamespace, id: &str, value: V) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now().checked_add(self.ttl),
        };
        self.entries.write().insert(Self::key(namespace, id), entry);
    }

    /// Returns a clone of the stored value if it has not expired.
    pub fn get(&self, namespace: CacheNamespace, id: &str) -> Option<V> {
        let key = Self::key(namespace, id);
        let now = Instant::now();

        {
            let entries = self.entries.read();
            match entries.get(&key) {
                None => {
                    tracing::trace!(%key, "cache miss");
                    return None;
                }
                Some(entry) if !entry.is_expired(now) => {
                    tracing::trace!(%key, "cache hit");
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock: a concurrent `set` may have refreshed it.
        let mut entries = self.entries.write();
        if entries.get(&key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(&key);
            tracing::trace!(%key, "cache entry expired");
        }
        None
    }

    /// Removes a single entry.
    pub fn del(&self, namespace: CacheNamespace, id: &str) {
        self.entries.write().remove(&Self::key(namespace, id));
    }

    /// Removes every entry in every namespace.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of stored entries, including stale ones not yet touched.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops all expired entries and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
