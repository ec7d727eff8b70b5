//! Application cache with per-entry expiry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    /// `None` when the TTL reaches past the clock's range.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// A thread-safe key/value cache.
///
/// Cloning shares the underlying map.
#[derive(Debug, Clone)]
pub struct Cache {
    inner: Arc<DashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl Cache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            default_ttl,
        }
    }

    /// Get a live entry. Expired entries are dropped on read.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        if let Some(entry) = self.inner.get(key) {
            if entry.is_live(now) {
                return Some(entry.value.clone());
            }
        }
        self.inner.remove_if(key, |_, entry| !entry.is_live(now));
        None
    }

    /// Store with the default TTL.
    pub fn put(&self, key: impl Into<String>, value: Value) {
        self.put_for(key, value, self.default_ttl);
    }

    pub fn put_for(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        self.inner.insert(
            key.into(),
            CacheEntry {
                value,
                expires_at: Instant::now().checked_add(ttl),
            },
        );
    }

    pub fn forget(&self, key: &str) -> Option<Value> {
        self.inner.remove(key).map(|(_, entry)| entry.value)
    }

    /// Return the cached value, computing and storing it on a miss.
    pub fn remember<F>(&self, key: &str, compute: F) -> Value
    where
        F: FnOnce() -> Value,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let value = compute();
        self.put(key, value.clone());
        value
    }

    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner.retain(|_, entry| entry.is_live(now));
        before - self.inner.len()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_operations() {
        let cache = Cache::new(Duration::from_secs(3600));
        assert!(cache.get("k").is_none());

        cache.put("k", Value::from("v"));
        assert_eq!(cache.get("k"), Some(Value::from("v")));

        assert_eq!(cache.forget("k"), Some(Value::from("v")));
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_expired_entries() {
        let cache = Cache::new(Duration::from_secs(3600));
        cache.put_for("gone", Value::from(1), Duration::ZERO);
        cache.put("kept", Value::from(2));

        assert!(cache.get("gone").is_none());
        cache.put_for("gone", Value::from(1), Duration::ZERO);
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_huge_ttl_never_expires() {
        let cache = Cache::new(Duration::from_secs(u64::MAX));
        cache.put("k", Value::from(1));
        assert_eq!(cache.get("k"), Some(Value::from(1)));
        assert_eq!(cache.remember("k", || Value::from(2)), Value::from(1));
        assert_eq!(cache.purge_expired(), 0);
    }

    #[test]
    fn test_remember_computes_once() {
        let cache = Cache::new(Duration::from_secs(60));
        let mut calls = 0;
        let first = cache.remember("answer", || {
            calls += 1;
            Value::from(42)
        });
        let second = cache.remember("answer", || {
            calls += 1;
            Value::from(0)
        });
        assert_eq!(first, second);
        assert_eq!(calls, 1);
    }
}
