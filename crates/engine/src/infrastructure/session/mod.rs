//! Session management for active story sessions
//!
//! The registry is the process-wide home of every live session. Entries are
//! added when a client connects, removed when authoring forks the story, and
//! expired after a fixed idle window. Expiry is enforced twice over: lookups
//! treat an over-idle session as already gone, and a per-session reaper task
//! wakes at the activity deadline and either removes the session or goes
//! back to sleep until the refreshed deadline.

mod errors;
mod player_session;

pub use errors::SessionError;
pub use player_session::PlayerSession;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

use storyloom_domain::{ItemCounts, Scene, SceneOption, SessionId};

use crate::infrastructure::graph::StoryGraph;
use crate::infrastructure::ports::RandomSource;

/// Holds every live session, keyed by session id.
///
/// Shared by `Arc`; per-entry locking comes from the backing concurrent map.
/// Overlapping requests against the same session id are not serialized
/// beyond that - a session is expected to be driven by one client at a time.
pub struct SessionRegistry {
    sessions: DashMap<SessionId, PlayerSession>,
    timeout: Duration,
}

impl SessionRegistry {
    /// Idle window after which a session is reclaimed.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20 * 60);

    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            timeout,
        }
    }

    /// Create a session pointed at the given start scene and arm its reaper.
    pub fn create_session(self: Arc<Self>, start_scene: Scene) -> SessionId {
        let session = PlayerSession::new(start_scene);
        let id = session.id();
        self.sessions.insert(id, session);
        tracing::info!("Created session {}", id);
        Self::spawn_reaper(self, id);
        id
    }

    /// One delayed task per session: sleep until the activity deadline, then
    /// either expire or re-arm against the refreshed deadline. Never fires
    /// early against activity recorded after the sleep was scheduled.
    fn spawn_reaper(registry: Arc<Self>, id: SessionId) {
        tokio::spawn(async move {
            loop {
                let deadline = match registry.sessions.get(&id) {
                    Some(entry) => entry.touched_at() + registry.timeout,
                    None => break, // ended explicitly
                };
                if Instant::now() >= deadline {
                    registry.sessions.remove(&id);
                    tracing::info!("Session {} expired", id);
                    break;
                }
                tokio::time::sleep_until(deadline).await;
            }
        });
    }

    /// Drop the session if it has out-idled the timeout. Returns true when
    /// the id no longer names a live session.
    fn expire_if_idle(&self, id: SessionId) -> bool {
        match self.sessions.get(&id) {
            Some(entry) if entry.idle_for() < self.timeout => false,
            Some(entry) => {
                drop(entry);
                self.sessions.remove(&id);
                tracing::info!("Session {} expired on lookup", id);
                true
            }
            None => true,
        }
    }

    /// Clone the session's current scene and inventory for projection.
    pub fn snapshot(&self, id: SessionId) -> Result<(Scene, ItemCounts), SessionError> {
        if self.expire_if_idle(id) {
            return Err(SessionError::NotFound(id));
        }
        let entry = self
            .sessions
            .get(&id)
            .ok_or(SessionError::NotFound(id))?;
        Ok((entry.scene().clone(), entry.items().clone()))
    }

    /// Run the weighted transition for one option choice.
    ///
    /// Validation and the draw happen under the entry guard; the destination
    /// fetch runs with no lock held; the arrival is applied under a fresh
    /// guard. See the registry docs for the overlapping-request policy.
    pub async fn choose(
        &self,
        id: SessionId,
        option_index: usize,
        graph: &StoryGraph,
        random: &dyn RandomSource,
    ) -> Result<(), SessionError> {
        if self.expire_if_idle(id) {
            return Err(SessionError::NotFound(id));
        }
        let destination = {
            let mut entry = self
                .sessions
                .get_mut(&id)
                .ok_or(SessionError::NotFound(id))?;
            entry.begin_choice(option_index, random)?
        };

        let scene = graph.scene(destination).await?;

        let mut entry = self
            .sessions
            .get_mut(&id)
            .ok_or(SessionError::NotFound(id))?;
        entry.arrive(scene);
        Ok(())
    }

    /// Append an authored option to the session's current scene, then end
    /// the session: authoring forks the narrative and the session's position
    /// is stale. Returns the updated scene and the session's final inventory
    /// for the response projection.
    pub async fn create_option(
        &self,
        id: SessionId,
        option: SceneOption,
        graph: &StoryGraph,
    ) -> Result<(Scene, ItemCounts), SessionError> {
        if self.expire_if_idle(id) {
            return Err(SessionError::NotFound(id));
        }
        let scene_id = {
            let entry = self
                .sessions
                .get(&id)
                .ok_or(SessionError::NotFound(id))?;
            if !entry.scene().has_option_capacity() {
                return Err(SessionError::TooManyOptions);
            }
            entry.scene().id
        };

        let updated = graph.create_option(scene_id, option).await?;

        let (_, session) = self
            .sessions
            .remove(&id)
            .ok_or(SessionError::NotFound(id))?;
        tracing::info!("Session {} ended after authoring an option", id);
        Ok((updated, session.into_items()))
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Insert a session without arming its reaper, to exercise the
    /// lookup-side expiry path in isolation (tests only).
    #[cfg(test)]
    fn insert_unreaped(&self, start_scene: Scene) -> SessionId {
        let session = PlayerSession::new(start_scene);
        let id = session.id();
        self.sessions.insert(id, session);
        id
    }

    /// Refresh a session's activity (tests only).
    #[cfg(test)]
    pub fn touch(&self, id: SessionId) -> bool {
        match self.sessions.get_mut(&id) {
            Some(mut entry) => {
                let scene = entry.scene().clone();
                entry.arrive(scene); // re-arrival at the same scene refreshes activity
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::random::ScriptedRandom;
    use crate::infrastructure::store::{MemoryBackend, Store, DEFAULT_CACHE_TTL};
    use storyloom_domain::{ItemId, Link};

    const TIMEOUT: Duration = Duration::from_secs(20 * 60);

    fn registry() -> Arc<SessionRegistry> {
        Arc::new(SessionRegistry::new(TIMEOUT))
    }

    fn graph() -> StoryGraph {
        let backend = Arc::new(MemoryBackend::new());
        StoryGraph::new(Arc::new(Store::new(backend, DEFAULT_CACHE_TTL)))
    }

    fn start_scene() -> Scene {
        Scene::new(Scene::start_id(), "welcome", ItemCounts::new())
    }

    async fn advance(by: Duration) {
        tokio::time::advance(by).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_is_absent_on_next_lookup() {
        // No reaper here: the lookup alone must treat the session as gone.
        let registry = registry();
        let id = registry.insert_unreaped(start_scene());

        advance(TIMEOUT + Duration::from_secs(1)).await;

        let err = registry.snapshot(id).expect_err("expired");
        assert!(matches!(err, SessionError::NotFound(_)));
        assert!(!registry.contains(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_active_within_window_remains_present() {
        let registry = registry();
        let id = Arc::clone(&registry).create_session(start_scene());

        advance(TIMEOUT - Duration::from_secs(60)).await;

        assert!(registry.snapshot(id).is_ok());
        assert!(registry.contains(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaper_removes_idle_session_without_a_lookup() {
        let registry = registry();
        let id = Arc::clone(&registry).create_session(start_scene());

        advance(TIMEOUT + Duration::from_secs(1)).await;
        tokio::task::yield_now().await;

        assert!(!registry.contains(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refreshed_activity_rearms_the_reaper() {
        let registry = registry();
        let id = Arc::clone(&registry).create_session(start_scene());

        // Refresh activity halfway through the window.
        advance(TIMEOUT / 2).await;
        assert!(registry.touch(id));

        // The original deadline passes; the reaper must not fire early.
        advance(TIMEOUT / 2 + Duration::from_secs(1)).await;
        tokio::task::yield_now().await;
        assert!(registry.contains(id));

        // The refreshed deadline passes; now it goes.
        advance(TIMEOUT / 2).await;
        tokio::task::yield_now().await;
        assert!(!registry.contains(id));
    }

    #[tokio::test]
    async fn test_choose_moves_the_session_and_grants_arrival_items() {
        let registry = registry();
        let graph = graph();

        let granted: ItemCounts = [(ItemId::new(), 2)].into_iter().collect();
        let destination = graph
            .create_scene("a mossy grotto", granted.clone(), None)
            .await
            .expect("create");

        let mut scene = start_scene();
        scene.options.push(SceneOption {
            value: "Descend".to_string(),
            required_items: ItemCounts::new(),
            link: vec![Link::new(destination, 1.0)],
        });

        let id = Arc::clone(&registry).create_session(scene);
        registry
            .choose(id, 0, &graph, &ScriptedRandom::new([0.0]))
            .await
            .expect("choose");

        let (current, items) = registry.snapshot(id).expect("live");
        assert_eq!(current.id, destination);
        assert_eq!(items, granted);
    }

    #[tokio::test]
    async fn test_choose_on_unknown_session_reports_not_found() {
        let registry = registry();
        let graph = graph();
        let err = registry
            .choose(SessionId::new(), 0, &graph, &ScriptedRandom::unused())
            .await
            .expect_err("unknown");
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_option_at_cap_fails_and_leaves_scene_unchanged() {
        let registry = registry();
        let graph = graph();

        let destination = graph
            .create_scene("beyond", ItemCounts::new(), None)
            .await
            .expect("create");
        let full_option = || SceneOption {
            value: "north".to_string(),
            required_items: ItemCounts::new(),
            link: vec![Link::new(destination, 1.0)],
        };

        let scene_id = graph
            .create_scene("a crowded junction", ItemCounts::new(), None)
            .await
            .expect("create");
        let mut scene = graph.scene(scene_id).await.expect("scene");
        for _ in 0..Scene::MAX_OPTIONS {
            scene = graph
                .create_option(scene_id, full_option())
                .await
                .expect("append");
        }
        assert_eq!(scene.options.len(), Scene::MAX_OPTIONS);

        let id = Arc::clone(&registry).create_session(scene);
        let err = registry
            .create_option(id, full_option(), &graph)
            .await
            .expect_err("at cap");
        assert!(matches!(err, SessionError::TooManyOptions));

        // Scene unchanged, session still alive.
        let reread = graph.scene(scene_id).await.expect("scene");
        assert_eq!(reread.options.len(), Scene::MAX_OPTIONS);
        assert!(registry.contains(id));
    }

    #[tokio::test]
    async fn test_create_option_appends_and_terminates_the_session() {
        let registry = registry();
        let graph = graph();

        let scene_id = graph
            .create_scene("a blank page", ItemCounts::new(), None)
            .await
            .expect("create");
        let destination = graph
            .create_scene("the next page", ItemCounts::new(), None)
            .await
            .expect("create");
        let scene = graph.scene(scene_id).await.expect("scene");

        let id = Arc::clone(&registry).create_session(scene);
        let (updated, _items) = registry
            .create_option(
                id,
                SceneOption {
                    value: "Turn the page".to_string(),
                    required_items: ItemCounts::new(),
                    link: vec![Link::new(destination, 1.0)],
                },
                &graph,
            )
            .await
            .expect("append");

        assert_eq!(updated.options.len(), 1);
        assert!(!registry.contains(id));
    }
}
