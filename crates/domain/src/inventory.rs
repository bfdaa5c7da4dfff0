//! Inventory and requirement maps
//!
//! An `ItemCounts` maps item ids to positive counts. It backs both a
//! session's inventory and an option's required-items gate; the same pruning
//! rule applies everywhere: a count never rests at zero or below, the key is
//! removed instead.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ItemId;

/// Map of item id to a positive count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCounts(HashMap<ItemId, u32>);

impl ItemCounts {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Held count for an item; absent entries count as zero.
    pub fn count(&self, id: ItemId) -> u32 {
        self.0.get(&id).copied().unwrap_or(0)
    }

    /// Apply a signed delta to an item's count, removing the key when the
    /// result would be zero or negative.
    pub fn add(&mut self, id: ItemId, delta: i64) {
        let amount = i64::from(self.count(id)) + delta;
        if amount <= 0 {
            self.0.remove(&id);
        } else {
            // amount is positive and bounded by u32 additions in practice
            self.0.insert(id, amount.min(i64::from(u32::MAX)) as u32);
        }
    }

    /// Increment every entry of `granted` into this map.
    pub fn grant_all(&mut self, granted: &ItemCounts) {
        for (&id, &count) in &granted.0 {
            self.add(id, i64::from(count));
        }
    }

    /// Decrement every entry of `required` out of this map.
    pub fn deduct_all(&mut self, required: &ItemCounts) {
        for (&id, &count) in &required.0 {
            self.add(id, -i64::from(count));
        }
    }

    /// True when every required count is covered by the held count.
    pub fn satisfies(&self, required: &ItemCounts) -> bool {
        required
            .0
            .iter()
            .all(|(&id, &count)| self.count(id) >= count)
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, u32)> + '_ {
        self.0.iter().map(|(&id, &count)| (id, count))
    }
}

impl FromIterator<(ItemId, u32)> for ItemCounts {
    fn from_iter<I: IntoIterator<Item = (ItemId, u32)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (id, count) in iter {
            counts.add(id, i64::from(count));
        }
        counts
    }
}
