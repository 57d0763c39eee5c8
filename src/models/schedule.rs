//! Schedule (solution) model.
//!
//! A schedule is an ordered sequence of activated providers, each with the
//! items it ships. Entry order is activation order, so the remaining time
//! after an entry's activation is determined by the prefix ending at it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ItemId, ProviderId};

/// A complete or partial schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Activated providers in activation order.
    pub entries: Vec<ScheduleEntry>,
}

/// One activated provider and the items it ships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Activated provider.
    pub provider: ProviderId,
    /// Items assigned to this provider, in shipping order.
    pub items: Vec<ItemId>,
}

impl ScheduleEntry {
    /// Creates an entry.
    pub fn new(provider: ProviderId, items: Vec<ItemId>) -> Self {
        Self { provider, items }
    }

    /// Creates an entry with no items.
    pub fn empty(provider: ProviderId) -> Self {
        Self::new(provider, Vec::new())
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a schedule from entries.
    pub fn from_entries(entries: Vec<ScheduleEntry>) -> Self {
        Self { entries }
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    /// Number of activated providers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no provider is activated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Activated providers in activation order.
    pub fn provider_order(&self) -> Vec<ProviderId> {
        self.entries.iter().map(|e| e.provider).collect()
    }

    /// Entry for a given provider.
    pub fn entry_for(&self, provider: ProviderId) -> Option<&ScheduleEntry> {
        self.entries.iter().find(|e| e.provider == provider)
    }

    /// Total number of assigned items, counting repeats.
    pub fn assigned_count(&self) -> usize {
        self.entries.iter().map(|e| e.items.len()).sum()
    }

    /// Distinct items appearing anywhere in the schedule.
    pub fn distinct_items(&self) -> BTreeSet<ItemId> {
        self.entries
            .iter()
            .flat_map(|e| e.items.iter().copied())
            .collect()
    }

    /// Drops entries that ship nothing.
    ///
    /// Removing an entry frees its activation cost for everything after it,
    /// so a valid schedule stays valid.
    pub fn without_idle_entries(&self) -> Schedule {
        Schedule::from_entries(
            self.entries
                .iter()
                .filter(|e| !e.items.is_empty())
                .cloned()
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> Schedule {
        Schedule::from_entries(vec![
            ScheduleEntry::new(2, vec![0, 3]),
            ScheduleEntry::empty(0),
            ScheduleEntry::new(1, vec![3, 4]),
        ])
    }

    #[test]
    fn test_provider_order() {
        assert_eq!(sample_schedule().provider_order(), vec![2, 0, 1]);
    }

    #[test]
    fn test_entry_for() {
        let s = sample_schedule();
        assert_eq!(s.entry_for(1).unwrap().items, vec![3, 4]);
        assert!(s.entry_for(7).is_none());
    }

    #[test]
    fn test_counts() {
        let s = sample_schedule();
        assert_eq!(s.len(), 3);
        assert_eq!(s.assigned_count(), 4);
        assert_eq!(s.distinct_items().into_iter().collect::<Vec<_>>(), vec![0, 3, 4]);
    }

    #[test]
    fn test_without_idle_entries() {
        let s = sample_schedule().without_idle_entries();
        assert_eq!(s.provider_order(), vec![2, 1]);
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::new();
        assert!(s.is_empty());
        assert_eq!(s.assigned_count(), 0);
        assert!(s.distinct_items().is_empty());
    }
}
