//! Read-through, write-behind store over a pluggable backend.
//!
//! Reads go through a TTL cache (absent results included); writes update the
//! cache immediately but are buffered until `commit`, which flushes every
//! pending set as one atomic batch. The request handler commits once per
//! inbound batch.

mod memory;
mod sqlite;

pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::ports::{StoreBackend, StoreError, StoreKey};

/// How long a read result (present or absent) is served from cache.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

pub struct Store {
    backend: Arc<dyn StoreBackend>,
    cache: TtlCache<StoreKey, Option<serde_json::Value>>,
    pending: Mutex<HashMap<StoreKey, serde_json::Value>>,
}

impl Store {
    pub fn new(backend: Arc<dyn StoreBackend>, cache_ttl: Duration) -> Self {
        Self {
            backend,
            cache: TtlCache::new(cache_ttl),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Read one value; `None` when the key is absent.
    pub async fn get<T: DeserializeOwned>(&self, key: StoreKey) -> Result<Option<T>, StoreError> {
        let mut found = self.get_many(vec![key]).await?;
        Ok(found.remove(&key))
    }

    /// Batched read. Absent keys are missing from the result map, and that
    /// absence is cached just like a present value.
    pub async fn get_many<T: DeserializeOwned>(
        &self,
        keys: Vec<StoreKey>,
    ) -> Result<HashMap<StoreKey, T>, StoreError> {
        let mut raw: HashMap<StoreKey, serde_json::Value> = HashMap::new();
        let mut misses: Vec<StoreKey> = Vec::new();

        for key in keys {
            match self.cache.get(&key).await {
                Some(Some(value)) => {
                    raw.insert(key, value);
                }
                Some(None) => {} // cached absence
                None => misses.push(key),
            }
        }

        if !misses.is_empty() {
            let fetched = self.backend.fetch_many(&misses).await?;
            for key in misses {
                let value = fetched.get(&key).cloned();
                self.cache.insert(key, value.clone()).await;
                if let Some(value) = value {
                    raw.insert(key, value);
                }
            }
        }

        raw.into_iter()
            .map(|(key, value)| {
                serde_json::from_value(value)
                    .map(|typed| (key, typed))
                    .map_err(StoreError::serialization)
            })
            .collect()
    }

    /// Record a write: visible to reads at once, persisted at `commit`.
    pub async fn set<T: Serialize>(&self, key: StoreKey, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_value(value).map_err(StoreError::serialization)?;
        self.cache.insert(key, Some(raw.clone())).await;
        self.pending.lock().await.insert(key, raw);
        Ok(())
    }

    /// Flush all pending writes as one atomic batch. A no-op when nothing is
    /// pending. On failure the error propagates; there is no retry.
    pub async fn commit(&self) -> Result<(), StoreError> {
        let drained: Vec<(StoreKey, serde_json::Value)> =
            self.pending.lock().await.drain().collect();
        if drained.is_empty() {
            return Ok(());
        }
        let count = drained.len();
        self.backend.write_batch(drained).await?;
        tracing::debug!("Committed {} pending write(s)", count);
        Ok(())
    }
}
