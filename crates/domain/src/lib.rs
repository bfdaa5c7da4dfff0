//! # Storyloom Domain
//!
//! Vocabulary types for the story graph: scenes, options, weighted links,
//! items, and inventories. Pure data with invariant helpers - no I/O, no
//! async, no randomness (random thresholds are injected by callers).

mod ids;
mod inventory;
mod item;
mod scene;

pub use ids::{ItemId, SceneId, SessionId};
pub use inventory::ItemCounts;
pub use item::Item;
pub use scene::{Link, LinkValidationError, Scene, SceneOption};
