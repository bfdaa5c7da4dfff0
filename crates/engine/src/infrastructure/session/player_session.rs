//! PlayerSession: one client's position in the story plus their inventory

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use storyloom_domain::{ItemCounts, LinkValidationError, Scene, SceneId, SessionId};

use super::SessionError;
use crate::infrastructure::ports::RandomSource;

/// Ephemeral per-player state: current scene snapshot, inventory, and the
/// last-interaction instant that drives expiry.
///
/// The scene is a snapshot of shared store data, not an owned part of the
/// graph; the inventory is exclusively this session's.
#[derive(Debug)]
pub struct PlayerSession {
    id: SessionId,
    scene: Scene,
    items: ItemCounts,
    touched_at: Instant,
    created_at: DateTime<Utc>,
}

impl PlayerSession {
    /// Start a session pointed at the given scene with an empty inventory.
    pub fn new(start_scene: Scene) -> Self {
        Self {
            id: SessionId::new(),
            scene: start_scene,
            items: ItemCounts::new(),
            touched_at: Instant::now(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn items(&self) -> &ItemCounts {
        &self.items
    }

    pub fn into_items(self) -> ItemCounts {
        self.items
    }

    /// Wall-clock creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Instant of the most recent interaction.
    pub fn touched_at(&self) -> Instant {
        self.touched_at
    }

    /// How long the session has been idle.
    pub fn idle_for(&self) -> std::time::Duration {
        self.touched_at.elapsed()
    }

    fn touch(&mut self) {
        self.touched_at = Instant::now();
    }

    /// True when the session's inventory covers every required count.
    pub fn has(&self, required: &ItemCounts) -> bool {
        self.items.satisfies(required)
    }

    /// Validate and resolve a choice, returning the destination scene id.
    ///
    /// Runs the transition up to the weighted draw: choice gating, option
    /// lookup, requirement check, requirement deduction, link validation,
    /// then the draw. The random source is only consulted after the links
    /// validate, so a bad weight never consumes randomness. The caller
    /// fetches the destination and completes the move with [`Self::arrive`].
    pub fn begin_choice(
        &mut self,
        index: usize,
        random: &dyn RandomSource,
    ) -> Result<SceneId, SessionError> {
        if !self.scene.offers_choice() {
            return Err(SessionError::NoChoices);
        }
        let option = self
            .scene
            .options
            .get(index)
            .ok_or(SessionError::OptionOutOfRange(index))?
            .clone();
        if !self.has(&option.required_items) {
            return Err(SessionError::MissingItems);
        }
        self.items.deduct_all(&option.required_items);

        let total = option.validate_links().map_err(|e| match e {
            LinkValidationError::NegativeWeight => SessionError::InvalidLinkWeights,
            LinkValidationError::Empty | LinkValidationError::ZeroTotalWeight => {
                SessionError::NoValidLinks
            }
        })?;

        let threshold = random.fraction() * total;
        let link = option
            .select_link(threshold)
            .ok_or(SessionError::NoValidLinks)?;
        Ok(link.value)
    }

    /// Complete a transition: collect the destination's granted items, move
    /// the scene pointer, and refresh activity.
    pub fn arrive(&mut self, destination: Scene) {
        self.items.grant_all(&destination.items);
        self.scene = destination;
        self.touch();
    }

    #[cfg(test)]
    pub fn items_mut(&mut self) -> &mut ItemCounts {
        &mut self.items
    }
}
