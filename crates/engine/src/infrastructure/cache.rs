//! TTL-based read cache for store lookups.
//!
//! Entries expire after a fixed TTL but are only dropped lazily: an expired
//! entry is invisible to `get` and reclaimed by `purge_expired`. The store
//! caches `Option<_>` values here, so a miss against the backing store is
//! itself cached for the TTL window.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// A thread-safe cache with time-to-live expiration.
pub struct TtlCache<K, V> {
    slots: RwLock<HashMap<K, CacheSlot<V>>>,
    ttl: Duration,
}

struct CacheSlot<V> {
    value: V,
    cached_at: Instant,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Cache a value, replacing any existing entry and resetting its TTL.
    pub async fn insert(&self, key: K, value: V) {
        let slot = CacheSlot {
            value,
            cached_at: Instant::now(),
        };
        self.slots.write().await.insert(key, slot);
    }

    /// Cache a value with an explicit timestamp (tests only).
    #[cfg(test)]
    pub async fn insert_at(&self, key: K, value: V, cached_at: Instant) {
        let slot = CacheSlot { value, cached_at };
        self.slots.write().await.insert(key, slot);
    }

    /// Get a value if it was cached within the TTL window.
    pub async fn get(&self, key: &K) -> Option<V> {
        let guard = self.slots.read().await;
        guard.get(key).and_then(|slot| {
            if slot.cached_at.elapsed() < self.ttl {
                Some(slot.value.clone())
            } else {
                None
            }
        })
    }

    /// Drop an entry regardless of its age.
    pub async fn remove(&self, key: &K) -> Option<V> {
        self.slots.write().await.remove(key).map(|slot| slot.value)
    }

    /// Reclaim every expired entry, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.slots.write().await;
        let before = guard.len();
        guard.retain(|_, slot| slot.cached_at.elapsed() < self.ttl);
        before - guard.len()
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slots.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));
        cache.insert("key".to_string(), 7).await;
        assert_eq!(cache.get(&"key".to_string()).await, Some(7));
    }

    #[tokio::test]
    async fn test_get_returns_none_for_missing() {
        let cache: TtlCache<String, i32> = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get(&"missing".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_cached_absence_is_a_hit() {
        // The store caches Option<_> values; a cached None must be
        // distinguishable from "not in cache".
        let cache: TtlCache<String, Option<i32>> = TtlCache::new(Duration::from_secs(60));
        cache.insert("gone".to_string(), None).await;
        assert_eq!(cache.get(&"gone".to_string()).await, Some(None));
    }

    #[tokio::test]
    async fn test_expired_entries_not_returned() {
        let ttl = Duration::from_millis(10);
        let cache: TtlCache<String, i32> = TtlCache::new(ttl);
        let stale = Instant::now() - (ttl + Duration::from_millis(1));
        cache.insert_at("key".to_string(), 7, stale).await;

        assert_eq!(cache.get(&"key".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_insert_resets_ttl() {
        let ttl = Duration::from_millis(10);
        let cache: TtlCache<String, i32> = TtlCache::new(ttl);
        let stale = Instant::now() - (ttl + Duration::from_millis(1));
        cache.insert_at("key".to_string(), 7, stale).await;
        cache.insert("key".to_string(), 8).await;

        assert_eq!(cache.get(&"key".to_string()).await, Some(8));
    }

    #[tokio::test]
    async fn test_purge_removes_only_expired() {
        let ttl = Duration::from_millis(10);
        let cache: TtlCache<String, i32> = TtlCache::new(ttl);
        let stale = Instant::now() - (ttl + Duration::from_millis(1));
        cache.insert_at("old1".to_string(), 1, stale).await;
        cache.insert_at("old2".to_string(), 2, stale).await;
        cache.insert("fresh".to_string(), 3).await;

        assert_eq!(cache.purge_expired().await, 2);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&"fresh".to_string()).await, Some(3));
    }

    #[tokio::test]
    async fn test_remove_ignores_expiry() {
        let ttl = Duration::from_millis(10);
        let cache: TtlCache<String, i32> = TtlCache::new(ttl);
        let stale = Instant::now() - (ttl + Duration::from_millis(1));
        cache.insert_at("key".to_string(), 7, stale).await;

        assert_eq!(cache.remove(&"key".to_string()).await, Some(7));
        assert!(cache.is_empty().await);
    }
}
