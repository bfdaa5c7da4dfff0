//! Scene, option, and link entities
//!
//! A scene is a node in the story graph: narrative text, items granted on
//! arrival, and up to [`Scene::MAX_OPTIONS`] options. Each option leads to a
//! destination scene through an ordered list of weighted links; traversal
//! draws a threshold in `[0, total_weight)` and picks the first link whose
//! cumulative weight reaches it. The threshold itself is injected so callers
//! control the randomness.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ItemCounts, SceneId};

/// A weighted edge from an option to a destination scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Destination scene id.
    pub value: SceneId,
    /// Non-negative selection weight.
    pub weight: f64,
}

impl Link {
    pub fn new(value: SceneId, weight: f64) -> Self {
        Self { value, weight }
    }
}

/// Why an option's link list cannot be traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LinkValidationError {
    #[error("link weight must be a non-negative number")]
    NegativeWeight,

    #[error("option has no links")]
    Empty,

    #[error("total link weight is zero")]
    ZeroTotalWeight,
}

/// A labeled choice out of a scene, gated by required items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneOption {
    /// Display text.
    pub value: String,
    /// Items the session must hold (and will spend) to take this option.
    #[serde(rename = "requiredItems", default)]
    pub required_items: ItemCounts,
    /// Ordered weighted edges to destination scenes.
    pub link: Vec<Link>,
}

impl SceneOption {
    /// Check the link list is traversable and return its total weight.
    ///
    /// Weights must be finite and non-negative, the list non-empty, and the
    /// total positive. Runs before any random draw so a bad weight never
    /// consumes randomness.
    pub fn validate_links(&self) -> Result<f64, LinkValidationError> {
        if self
            .link
            .iter()
            .any(|l| l.weight < 0.0 || !l.weight.is_finite())
        {
            return Err(LinkValidationError::NegativeWeight);
        }
        if self.link.is_empty() {
            return Err(LinkValidationError::Empty);
        }
        let total: f64 = self.link.iter().map(|l| l.weight).sum();
        if total == 0.0 {
            return Err(LinkValidationError::ZeroTotalWeight);
        }
        Ok(total)
    }

    /// Select the destination for a draw threshold in `[0, total_weight)`.
    ///
    /// Walks links in order accumulating weight; the first link whose
    /// cumulative weight is >= the threshold wins, ties broken by link
    /// order. Left-biased by construction, not strict inverse-CDF sampling.
    pub fn select_link(&self, threshold: f64) -> Option<&Link> {
        let mut cumulative = 0.0;
        for link in &self.link {
            cumulative += link.weight;
            if cumulative >= threshold {
                return Some(link);
            }
        }
        None
    }
}

/// A node in the story graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    /// Narrative text.
    pub value: String,
    /// Items granted on arrival.
    #[serde(default)]
    pub items: ItemCounts,
    #[serde(default)]
    pub options: Vec<SceneOption>,
}

impl Scene {
    /// A scene's options array never grows past this.
    pub const MAX_OPTIONS: usize = 4;

    /// Id of the global start scene every new session points at.
    pub fn start_id() -> SceneId {
        SceneId::from_uuid(Uuid::from_u128(0xbb17_9099_b85c_4558_8cb9_d658_b0d4_2cce))
    }

    pub fn new(id: SceneId, value: impl Into<String>, items: ItemCounts) -> Self {
        Self {
            id,
            value: value.into(),
            items,
            options: Vec::new(),
        }
    }

    pub fn is_start(&self) -> bool {
        self.id == Self::start_id()
    }

    /// A non-start scene with one option (or none) is a forced continuation,
    /// not a real choice.
    pub fn offers_choice(&self) -> bool {
        self.options.len() > 1 || self.is_start()
    }

    pub fn has_option_capacity(&self) -> bool {
        self.options.len() < Self::MAX_OPTIONS
    }
}
