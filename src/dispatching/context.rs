//! Ordering context for rule evaluation.

use crate::models::Instance;

/// State passed to ordering rules.
///
/// `scores` may differ from the instance's scores, e.g. with items already
/// covered by a fixed prefix zeroed out; `time_budget` is the budget still
/// available to the providers being ordered.
#[derive(Debug, Clone, Copy)]
pub struct OrderingContext<'a> {
    /// Item scores to value catalogs with.
    pub scores: &'a [u64],
    /// Budget available for activations.
    pub time_budget: u64,
}

impl<'a> OrderingContext<'a> {
    /// Context with the instance's own scores and full budget.
    pub fn new(instance: &'a Instance) -> Self {
        Self {
            scores: instance.scores(),
            time_budget: instance.time_budget(),
        }
    }

    /// Replaces the item scores.
    pub fn with_scores(mut self, scores: &'a [u64]) -> Self {
        self.scores = scores;
        self
    }

    /// Replaces the available budget.
    pub fn with_time_budget(mut self, time_budget: u64) -> Self {
        self.time_budget = time_budget;
        self
    }

    /// Score of `item`, 0 when out of range.
    pub fn score(&self, item: usize) -> u64 {
        self.scores.get(item).copied().unwrap_or(0)
    }
}
