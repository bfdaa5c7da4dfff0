//! Batch request handler for the play endpoint.
//!
//! Translates a batch of typed actions into session and store operations.
//! Domain failures become per-action error entries; store failures abort the
//! whole batch. Deferred store writes are flushed once per batch.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;

use storyloom_domain::{ItemCounts, ItemId, Link, Scene, SceneId, SceneOption, SessionId};
use storyloom_protocol::{Action, ActionResult, DraftItem, DraftScene, PlayRequest};

use crate::application::projection::project_scene;
use crate::infrastructure::graph::StoryGraph;
use crate::infrastructure::ports::{RandomSource, StoreError};
use crate::infrastructure::session::{SessionError, SessionRegistry};

/// Longest accepted option or item name.
const MAX_NAME_LEN: usize = 50;
/// Longest accepted item description.
const MAX_ITEM_DESCRIPTION_LEN: usize = 100;
/// Longest accepted scene text.
const MAX_SCENE_TEXT_LEN: usize = 500;

/// Rejections for author-submitted content. All user-facing.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} is too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },

    #[error("Option has no links")]
    NoLinks,

    #[error("Link weights must be non-negative")]
    NegativeWeight,

    #[error("No traversable links (total weight is zero)")]
    ZeroWeight,

    #[error("Link references an unknown scene: {0}")]
    UnknownScene(SceneId),
}

pub struct PlayService {
    registry: Arc<SessionRegistry>,
    graph: Arc<StoryGraph>,
    random: Arc<dyn RandomSource>,
}

impl PlayService {
    pub fn new(
        registry: Arc<SessionRegistry>,
        graph: Arc<StoryGraph>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self {
            registry,
            graph,
            random,
        }
    }

    /// Execute a batch, returning one result per action in submission order.
    ///
    /// Sequential batches run strictly one after another. "Parallel" batches
    /// start every action before any is awaited - cooperative interleaving
    /// on one runtime, not multi-core parallelism. Either way the batch ends
    /// with a single store commit.
    pub async fn handle_batch(
        &self,
        request: PlayRequest,
    ) -> Result<Vec<ActionResult>, StoreError> {
        let outcomes = if request.parallel {
            join_all(request.requests.into_iter().map(|a| self.handle_action(a))).await
        } else {
            let mut outcomes = Vec::with_capacity(request.requests.len());
            for action in request.requests {
                outcomes.push(self.handle_action(action).await);
            }
            outcomes
        };

        let mut results = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            results.push(outcome?);
        }

        self.graph.commit().await?;
        Ok(results)
    }

    async fn handle_action(&self, action: Action) -> Result<ActionResult, StoreError> {
        match action {
            Action::NewSession => self.handle_new_session().await,
            Action::ChooseOption { session, option } => {
                self.handle_choose(session, option).await
            }
            Action::GetScene { session } => self.handle_get_scene(session).await,
            Action::NewOption {
                session,
                new_items,
                new_scenes,
                option,
            } => {
                self.handle_new_option(session, new_items, new_scenes, option)
                    .await
            }
        }
    }

    async fn handle_new_session(&self) -> Result<ActionResult, StoreError> {
        let start = self.graph.scene(Scene::start_id()).await?;
        let id = Arc::clone(&self.registry).create_session(start);
        match self.registry.snapshot(id) {
            Ok((scene, items)) => {
                let scene = project_scene(&scene, &items, &self.graph).await?;
                Ok(ActionResult::NewSession { id, scene })
            }
            Err(e) => user_error(e),
        }
    }

    async fn handle_choose(
        &self,
        session: SessionId,
        option_index: usize,
    ) -> Result<ActionResult, StoreError> {
        let choice = self
            .registry
            .choose(session, option_index, &self.graph, self.random.as_ref())
            .await;
        if let Err(e) = choice {
            return user_error(e);
        }
        self.handle_get_scene(session).await
    }

    async fn handle_get_scene(&self, session: SessionId) -> Result<ActionResult, StoreError> {
        match self.registry.snapshot(session) {
            Ok((scene, items)) => {
                let payload = project_scene(&scene, &items, &self.graph).await?;
                Ok(ActionResult::GetScene(payload))
            }
            Err(e) => user_error(e),
        }
    }

    async fn handle_new_option(
        &self,
        session: SessionId,
        new_items: HashMap<ItemId, DraftItem>,
        new_scenes: HashMap<SceneId, DraftScene>,
        option: SceneOption,
    ) -> Result<ActionResult, StoreError> {
        if let Err(e) = validate_new_option(&new_items, &new_scenes, &option) {
            return Ok(ActionResult::error(e.to_string()));
        }

        // Every link must point at a draft scene or one that already exists.
        for link in &option.link {
            if !new_scenes.contains_key(&link.value)
                && self.graph.get_scene(link.value).await?.is_none()
            {
                return Ok(ActionResult::error(
                    ValidationError::UnknownScene(link.value).to_string(),
                ));
            }
        }

        let resolution = self.resolve_drafts(new_items, new_scenes).await?;
        let resolved = SceneOption {
            value: option.value,
            required_items: resolution.resolve_counts(&option.required_items),
            link: option
                .link
                .iter()
                .map(|l| Link::new(resolution.resolve_scene(l.value), l.weight))
                .collect(),
        };

        match self
            .registry
            .create_option(session, resolved, &self.graph)
            .await
        {
            Ok((scene, items)) => {
                let payload = project_scene(&scene, &items, &self.graph).await?;
                Ok(ActionResult::GetScene(payload))
            }
            Err(e) => user_error(e),
        }
    }

    /// Persist every draft exactly once, items before the scenes that may
    /// grant them, and record draft id -> persisted id in the table.
    async fn resolve_drafts(
        &self,
        new_items: HashMap<ItemId, DraftItem>,
        new_scenes: HashMap<SceneId, DraftScene>,
    ) -> Result<DraftResolution, StoreError> {
        let mut resolution = DraftResolution::default();

        for (draft_id, draft) in new_items {
            let id = self.graph.create_item(draft.name, draft.description).await?;
            resolution.items.insert(draft_id, id);
        }

        for (draft_id, draft) in new_scenes {
            let items = resolution.resolve_counts(&draft.items);
            let id = self.graph.create_scene(draft.value, items, None).await?;
            resolution.scenes.insert(draft_id, id);
        }

        Ok(resolution)
    }
}

/// Draft id -> persisted id. Ids with no entry pass through unchanged, so
/// references to already-persisted scenes and items resolve to themselves.
#[derive(Default)]
struct DraftResolution {
    items: HashMap<ItemId, ItemId>,
    scenes: HashMap<SceneId, SceneId>,
}

impl DraftResolution {
    fn resolve_item(&self, id: ItemId) -> ItemId {
        self.items.get(&id).copied().unwrap_or(id)
    }

    fn resolve_scene(&self, id: SceneId) -> SceneId {
        self.scenes.get(&id).copied().unwrap_or(id)
    }

    fn resolve_counts(&self, counts: &ItemCounts) -> ItemCounts {
        counts
            .iter()
            .map(|(id, count)| (self.resolve_item(id), count))
            .collect()
    }
}

fn user_error(e: SessionError) -> Result<ActionResult, StoreError> {
    match e {
        SessionError::Store(inner) => Err(inner),
        other => Ok(ActionResult::error(other.to_string())),
    }
}

fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

fn validate_new_option(
    new_items: &HashMap<ItemId, DraftItem>,
    new_scenes: &HashMap<SceneId, DraftScene>,
    option: &SceneOption,
) -> Result<(), ValidationError> {
    validate_name("Option name", &option.value)?;

    for draft in new_items.values() {
        validate_name("Item name", &draft.name)?;
        if let Some(description) = &draft.description {
            if description.chars().count() > MAX_ITEM_DESCRIPTION_LEN {
                return Err(ValidationError::TooLong {
                    field: "Item description",
                    max: MAX_ITEM_DESCRIPTION_LEN,
                });
            }
        }
    }

    for draft in new_scenes.values() {
        if draft.value.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "Scene text",
            });
        }
        if draft.value.chars().count() > MAX_SCENE_TEXT_LEN {
            return Err(ValidationError::TooLong {
                field: "Scene text",
                max: MAX_SCENE_TEXT_LEN,
            });
        }
    }

    option.validate_links().map_err(|e| match e {
        storyloom_domain::LinkValidationError::NegativeWeight => ValidationError::NegativeWeight,
        storyloom_domain::LinkValidationError::Empty => ValidationError::NoLinks,
        storyloom_domain::LinkValidationError::ZeroTotalWeight => ValidationError::ZeroWeight,
    })?;

    Ok(())
}
