//! Shared application state wired at startup.

use std::sync::Arc;

use crate::application::PlayService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::graph::StoryGraph;
use crate::infrastructure::ports::{StoreBackend, StoreError};
use crate::infrastructure::random::ThreadRngSource;
use crate::infrastructure::session::SessionRegistry;
use crate::infrastructure::store::Store;

pub struct AppState {
    pub play: PlayService,
    pub config: AppConfig,
}

impl AppState {
    /// Wire the store, graph, and session registry over the given backend,
    /// seeding the start scene on first boot.
    pub async fn new(
        backend: Arc<dyn StoreBackend>,
        config: AppConfig,
    ) -> Result<Self, StoreError> {
        let store = Arc::new(Store::new(backend, config.store_cache_ttl));
        let graph = Arc::new(StoryGraph::new(store));
        graph.ensure_start_scene().await?;

        let registry = Arc::new(SessionRegistry::new(config.session_timeout));
        let play = PlayService::new(registry, graph, Arc::new(ThreadRngSource::new()));

        Ok(Self { play, config })
    }
}
