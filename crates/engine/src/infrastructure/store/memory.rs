//! In-memory store backend.
//!
//! Backs tests and local experiments; mirrors the SQLite adapter's contract
//! without touching disk.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::infrastructure::ports::{StoreBackend, StoreError, StoreKey};

#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<StoreKey, serde_json::Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted entries (for tests).
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Raw persisted value for a key (for tests).
    pub async fn raw_value(&self, key: &StoreKey) -> Option<serde_json::Value> {
        self.entries.read().await.get(key).cloned()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn fetch_many(
        &self,
        keys: &[StoreKey],
    ) -> Result<HashMap<StoreKey, serde_json::Value>, StoreError> {
        let guard = self.entries.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| guard.get(key).map(|value| (*key, value.clone())))
            .collect())
    }

    async fn write_batch(
        &self,
        entries: Vec<(StoreKey, serde_json::Value)>,
    ) -> Result<(), StoreError> {
        let mut guard = self.entries.write().await;
        for (key, value) in entries {
            guard.insert(key, value);
        }
        Ok(())
    }
}
