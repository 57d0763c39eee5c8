//! Item model.
//!
//! An item is a scoreable unit of value that one or more providers can
//! supply. Items are credited at most once across a whole schedule.

use serde::{Deserialize, Serialize};

/// Item identifier (`0 <= id < num_items`).
pub type ItemId = usize;

/// A scoreable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier.
    pub id: ItemId,
    /// Score credited when the item is covered (non-negative).
    pub score: u64,
}

impl Item {
    /// Creates a new item.
    pub fn new(id: ItemId, score: u64) -> Self {
        Self { id, score }
    }

    /// Whether covering this item changes the objective at all.
    #[inline]
    pub fn is_scoring(&self) -> bool {
        self.score > 0
    }
}
