//! Play endpoint request and response shapes

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use storyloom_domain::{Item, ItemCounts, ItemId, SceneId, SceneOption, SessionId};

/// Batch envelope for `POST /api/play`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayRequest {
    /// When set, actions are started together and interleave cooperatively;
    /// otherwise they run strictly one after another. Results come back in
    /// submission order either way.
    #[serde(default)]
    pub parallel: bool,
    pub requests: Vec<Action>,
}

/// A single typed action inside a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Action {
    #[serde(rename = "newSession")]
    NewSession,

    #[serde(rename = "chooseOption")]
    ChooseOption { session: SessionId, option: usize },

    #[serde(rename = "getScene")]
    GetScene { session: SessionId },

    #[serde(rename = "newOption")]
    NewOption {
        session: SessionId,
        /// Author-drafted items, keyed by the draft id used inside `option`.
        #[serde(rename = "newItems", default)]
        new_items: HashMap<ItemId, DraftItem>,
        /// Author-drafted scenes, keyed by the draft id used inside `option`.
        #[serde(rename = "newScenes", default)]
        new_scenes: HashMap<SceneId, DraftScene>,
        option: SceneOption,
    },
}

/// An item the author defined inline while creating an option. Its key in
/// the draft map is a placeholder id; the engine allocates the real one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A scene the author defined inline while creating an option. Draft scenes
/// start with no options of their own; their granted items may reference
/// draft item ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftScene {
    pub value: String,
    #[serde(default)]
    pub items: ItemCounts,
}

/// One result per submitted action, tagged by shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActionResult {
    #[serde(rename = "newSession")]
    NewSession { id: SessionId, scene: ScenePayload },

    #[serde(rename = "getScene")]
    GetScene(ScenePayload),

    #[serde(rename = "error")]
    Error { message: String },
}

impl ActionResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Projection of a session's current scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenePayload {
    pub id: SceneId,
    /// Narrative text.
    pub value: String,
    pub options: Vec<OptionPayload>,
    /// The session's inventory, id -> count.
    pub items: ItemCounts,
    /// Details for every held item, id -> item.
    #[serde(rename = "itemMap")]
    pub item_map: HashMap<ItemId, Item>,
}

/// A projected option: display text plus whether the session may take it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionPayload {
    pub value: String,
    pub locked: bool,
}
