//! # Storyloom Protocol
//!
//! Wire types for the single play endpoint. A client POSTs a batch of typed
//! actions and receives one result per action, in submission order. These
//! types are the stable contract between the engine and the browser client;
//! changes here are breaking changes for deployed clients.

mod play;

pub use play::{
    Action, ActionResult, DraftItem, DraftScene, OptionPayload, PlayRequest, ScenePayload,
};
