//! # Storyloom Engine
//!
//! Server-side implementation of the story graph game: the key-value story
//! store with its read-through cache, story graph operations, the ephemeral
//! session registry with its weighted-traversal engine, the batch request
//! handler, and the HTTP surface.

pub mod application;
pub mod infrastructure;
