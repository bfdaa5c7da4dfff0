//! Story graph operations over the store.
//!
//! Scenes persist only resolved option definitions: items and sub-scenes
//! referenced by newly-authored content are created first, so the persisted
//! graph never contains dangling draft ids.

use std::collections::HashMap;
use std::sync::Arc;

use storyloom_domain::{Item, ItemCounts, ItemId, Scene, SceneId, SceneOption};

use crate::infrastructure::ports::{StoreError, StoreKey};
use crate::infrastructure::store::Store;

const START_SCENE_TEXT: &str =
    "Welcome to Storyloom, where the adventure is built by you!";

pub struct StoryGraph {
    store: Arc<Store>,
}

impl StoryGraph {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub async fn get_scene(&self, id: SceneId) -> Result<Option<Scene>, StoreError> {
        self.store.get(StoreKey::scene(id)).await
    }

    /// Fetch a scene the graph requires to exist (e.g. a link destination).
    pub async fn scene(&self, id: SceneId) -> Result<Scene, StoreError> {
        self.get_scene(id)
            .await?
            .ok_or_else(|| StoreError::not_found("Scene", id))
    }

    /// Batched item lookup. Missing ids are absent from the result, never an
    /// error.
    pub async fn get_items(&self, ids: &[ItemId]) -> Result<HashMap<ItemId, Item>, StoreError> {
        let keys: Vec<StoreKey> = ids.iter().map(|&id| StoreKey::item(id)).collect();
        let found: HashMap<StoreKey, Item> = self.store.get_many(keys).await?;
        Ok(found
            .into_values()
            .map(|item| (item.id, item))
            .collect())
    }

    /// Write a new scene with no options; allocates an id unless one is
    /// supplied (the start scene has a fixed id).
    pub async fn create_scene(
        &self,
        text: impl Into<String>,
        items: ItemCounts,
        id: Option<SceneId>,
    ) -> Result<SceneId, StoreError> {
        let id = id.unwrap_or_default();
        let scene = Scene::new(id, text, items);
        self.store.set(StoreKey::scene(id), &scene).await?;
        Ok(id)
    }

    pub async fn create_item(
        &self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<ItemId, StoreError> {
        let id = ItemId::new();
        let item = Item::new(id, name, description);
        self.store.set(StoreKey::item(id), &item).await?;
        Ok(id)
    }

    /// Append an option to a scene and write the whole scene back. The
    /// 4-option cap is enforced by the session engine before calling this.
    pub async fn create_option(
        &self,
        scene_id: SceneId,
        option: SceneOption,
    ) -> Result<Scene, StoreError> {
        let mut scene = self.scene(scene_id).await?;
        scene.options.push(option);
        self.store.set(StoreKey::scene(scene_id), &scene).await?;
        Ok(scene)
    }

    /// Create the global start scene on first boot.
    pub async fn ensure_start_scene(&self) -> Result<(), StoreError> {
        let start = Scene::start_id();
        if self.get_scene(start).await?.is_none() {
            tracing::info!("Seeding start scene {}", start);
            self.create_scene(START_SCENE_TEXT, ItemCounts::new(), Some(start))
                .await?;
            self.store.commit().await?;
        }
        Ok(())
    }

    /// Flush this request's deferred writes.
    pub async fn commit(&self) -> Result<(), StoreError> {
        self.store.commit().await
    }
}
