//! Ports for persistence and randomness, with their error types.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use storyloom_domain::{ItemId, SceneId};

/// The two persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Scenes,
    Items,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Scenes => "scenes",
            Collection::Items => "items",
        }
    }
}

/// Fully-qualified storage key: collection plus opaque id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub collection: Collection,
    pub id: Uuid,
}

impl StoreKey {
    pub fn scene(id: SceneId) -> Self {
        Self {
            collection: Collection::Scenes,
            id: id.into(),
        }
    }

    pub fn item(id: ItemId) -> Self {
        Self {
            collection: Collection::Items,
            id: id.into(),
        }
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection.as_str(), self.id)
    }
}

/// Store operation errors with context for debugging.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Entity not found where the graph requires it to exist.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Backend operation failed - includes operation name for tracing.
    #[error("Store error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn backend(operation: &'static str, message: impl ToString) -> Self {
        Self::Backend {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Raw persistence behind the read-through store.
///
/// Adapters: [`crate::infrastructure::store::SqliteBackend`] for the real
/// deployment, [`crate::infrastructure::store::MemoryBackend`] for tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Fetch raw values for the given keys. Absent keys are simply missing
    /// from the result map, never an error.
    async fn fetch_many(
        &self,
        keys: &[StoreKey],
    ) -> Result<HashMap<StoreKey, serde_json::Value>, StoreError>;

    /// Persist every entry as one atomic batch.
    async fn write_batch(
        &self,
        entries: Vec<(StoreKey, serde_json::Value)>,
    ) -> Result<(), StoreError>;
}

/// Uniform randomness injected into the session engine so the weighted draw
/// is reproducible under test.
pub trait RandomSource: Send + Sync {
    /// Uniform draw in `[0, 1)`.
    fn fraction(&self) -> f64;
}
