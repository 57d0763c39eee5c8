//! Incremental schedule builder.
//!
//! Builds a schedule one move at a time under the same feasibility rules
//! the formulations encode. A rejected move returns a [`MoveError`] and
//! leaves the builder untouched, so greedy constructors can simply try the
//! next candidate.
//!
//! Cross-provider duplicate items are not rejected here.
//! [`validate_schedule`](crate::validation::validate_schedule) is the single
//! authority on that invariant; callers needing hard prevention consult
//! [`ScheduleBuilder::is_supplied`] before calling
//! [`supply`](ScheduleBuilder::supply).

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Instance, ItemId, ProviderId, Schedule, ScheduleEntry};

/// A rejected builder move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("provider {0} does not exist")]
    UnknownProvider(ProviderId),
    #[error("item {0} does not exist")]
    UnknownItem(ItemId),
    #[error("provider {0} is already activated")]
    AlreadyActivated(ProviderId),
    #[error("provider {provider} costs {cost}, only {remaining} left")]
    BudgetExceeded {
        provider: ProviderId,
        cost: u64,
        remaining: u64,
    },
    #[error("provider {0} is not activated")]
    NotActivated(ProviderId),
    #[error("item {item} is not in provider {provider}'s catalog")]
    NotInCatalog { provider: ProviderId, item: ItemId },
    #[error("provider {0} has no shipping capacity left")]
    CapacityExhausted(ProviderId),
}

/// Mutable single-owner builder over one [`Instance`].
///
/// # Example
/// ```
/// use u_provision::builder::ScheduleBuilder;
/// use u_provision::models::{Instance, Provider};
///
/// let instance = Instance::new(
///     2,
///     vec![10, 1],
///     vec![Provider::new(0, 1, 5).with_catalog(vec![0, 1])],
/// ).unwrap();
///
/// let mut builder = ScheduleBuilder::new(&instance);
/// builder.activate(0).unwrap();
/// builder.supply(0, 0).unwrap();
/// builder.supply(0, 1).unwrap();
/// assert_eq!(builder.remaining_budget(), 1);
/// assert_eq!(builder.schedule().assigned_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleBuilder<'a> {
    instance: &'a Instance,
    schedule: Schedule,
    remaining_budget: u64,
    /// Entry index per provider once activated.
    position: Vec<Option<usize>>,
    /// Shipments left per provider.
    capacity: Vec<u64>,
    supplied: Vec<HashSet<ItemId>>,
    /// Number of entries holding each item.
    usage: Vec<u32>,
}

impl<'a> ScheduleBuilder<'a> {
    /// Creates a builder with an empty schedule and the full budget.
    pub fn new(instance: &'a Instance) -> Self {
        let n = instance.num_providers();
        Self {
            instance,
            schedule: Schedule::new(),
            remaining_budget: instance.time_budget(),
            position: vec![None; n],
            capacity: vec![0; n],
            supplied: vec![HashSet::new(); n],
            usage: vec![0; instance.num_items()],
        }
    }

    /// Appends `provider` to the activation order.
    ///
    /// Its shipping capacity becomes `throughput_rate × remaining` with
    /// `remaining` measured after paying its own activation cost.
    pub fn activate(&mut self, provider: ProviderId) -> Result<(), MoveError> {
        let result = self.try_activate(provider);
        if let Err(e) = &result {
            tracing::debug!(provider, error = %e, "activation rejected");
        }
        result
    }

    fn try_activate(&mut self, provider: ProviderId) -> Result<(), MoveError> {
        let instance = self.instance;
        let p = instance
            .get_provider(provider)
            .ok_or(MoveError::UnknownProvider(provider))?;
        if self.position[provider].is_some() {
            return Err(MoveError::AlreadyActivated(provider));
        }
        let remaining = self
            .remaining_budget
            .checked_sub(p.activation_cost)
            .ok_or(MoveError::BudgetExceeded {
                provider,
                cost: p.activation_cost,
                remaining: self.remaining_budget,
            })?;

        self.remaining_budget = remaining;
        self.position[provider] = Some(self.schedule.len());
        self.capacity[provider] = p.capacity(remaining);
        self.schedule.push(ScheduleEntry::empty(provider));
        Ok(())
    }

    /// Records that `provider` ships `item`.
    ///
    /// Supplying an item twice from the same provider is accepted with a
    /// warning; the duplicate is recorded and later flagged by validation.
    pub fn supply(&mut self, provider: ProviderId, item: ItemId) -> Result<(), MoveError> {
        let result = self.try_supply(provider, item);
        if let Err(e) = &result {
            tracing::debug!(provider, item, error = %e, "supply rejected");
        }
        result
    }

    fn try_supply(&mut self, provider: ProviderId, item: ItemId) -> Result<(), MoveError> {
        if provider >= self.instance.num_providers() {
            return Err(MoveError::UnknownProvider(provider));
        }
        if item >= self.instance.num_items() {
            return Err(MoveError::UnknownItem(item));
        }
        let entry = self.position[provider].ok_or(MoveError::NotActivated(provider))?;
        if !self.instance.supplies(provider, item) {
            return Err(MoveError::NotInCatalog { provider, item });
        }
        if self.capacity[provider] == 0 {
            return Err(MoveError::CapacityExhausted(provider));
        }

        if !self.supplied[provider].insert(item) {
            tracing::warn!(provider, item, "item supplied twice by the same provider");
        }
        self.schedule.entries[entry].items.push(item);
        self.capacity[provider] -= 1;
        self.usage[item] += 1;
        Ok(())
    }

    /// Whether any activated provider already ships `item`.
    pub fn is_supplied(&self, item: ItemId) -> bool {
        self.usage.get(item).is_some_and(|&n| n > 0)
    }

    /// Budget left for further activations.
    pub fn remaining_budget(&self) -> u64 {
        self.remaining_budget
    }

    /// Shipments left for `provider`; 0 if not activated.
    pub fn remaining_capacity(&self, provider: ProviderId) -> u64 {
        self.capacity.get(provider).copied().unwrap_or(0)
    }

    pub fn is_activated(&self, provider: ProviderId) -> bool {
        self.position.get(provider).is_some_and(Option::is_some)
    }

    /// Schedule built so far.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn into_schedule(self) -> Schedule {
        self.schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;
    use crate::validation::{validate_schedule, ValidationErrorKind};

    fn shared_item_instance() -> Instance {
        Instance::new(
            10,
            vec![5, 2],
            vec![
                Provider::new(0, 1, 1).with_catalog(vec![0, 1]),
                Provider::new(1, 3, 1).with_catalog(vec![0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_activation_over_budget_leaves_state() {
        let inst = Instance::new(
            2,
            vec![10, 1],
            vec![Provider::new(0, 3, 5).with_catalog(vec![0, 1])],
        )
        .unwrap();
        let mut b = ScheduleBuilder::new(&inst);
        assert_eq!(
            b.activate(0),
            Err(MoveError::BudgetExceeded {
                provider: 0,
                cost: 3,
                remaining: 2
            })
        );
        assert_eq!(b.remaining_budget(), 2);
        assert!(!b.is_activated(0));
        assert!(b.schedule().is_empty());
    }

    #[test]
    fn test_activate_sets_capacity() {
        let inst = shared_item_instance();
        let mut b = ScheduleBuilder::new(&inst);
        b.activate(1).unwrap();
        assert_eq!(b.remaining_budget(), 7);
        assert_eq!(b.remaining_capacity(1), 7);
        assert_eq!(b.activate(1), Err(MoveError::AlreadyActivated(1)));
        assert_eq!(b.remaining_budget(), 7);
        assert_eq!(b.activate(4), Err(MoveError::UnknownProvider(4)));
    }

    #[test]
    fn test_supply_rules() {
        let inst = shared_item_instance();
        let mut b = ScheduleBuilder::new(&inst);
        assert_eq!(b.supply(0, 0), Err(MoveError::NotActivated(0)));
        b.activate(1).unwrap();
        assert_eq!(
            b.supply(1, 1),
            Err(MoveError::NotInCatalog {
                provider: 1,
                item: 1
            })
        );
        assert_eq!(b.supply(1, 9), Err(MoveError::UnknownItem(9)));
        b.supply(1, 0).unwrap();
        assert_eq!(b.remaining_capacity(1), 6);
        assert!(b.is_supplied(0));
        assert!(!b.is_supplied(1));
    }

    #[test]
    fn test_capacity_exhausted() {
        let inst = Instance::new(
            2,
            vec![1, 1],
            vec![Provider::new(0, 1, 1).with_catalog(vec![0, 1])],
        )
        .unwrap();
        let mut b = ScheduleBuilder::new(&inst);
        b.activate(0).unwrap();
        b.supply(0, 0).unwrap();
        assert_eq!(b.supply(0, 1), Err(MoveError::CapacityExhausted(0)));
        assert_eq!(b.schedule().entries[0].items, vec![0]);
    }

    #[test]
    fn test_duplicate_within_provider_is_recorded() {
        let inst = shared_item_instance();
        let mut b = ScheduleBuilder::new(&inst);
        b.activate(0).unwrap();
        b.supply(0, 0).unwrap();
        b.supply(0, 0).unwrap();
        assert_eq!(b.schedule().entries[0].items, vec![0, 0]);
        let errors = validate_schedule(&inst, b.schedule()).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateItemInEntry));
    }

    #[test]
    fn test_cross_provider_duplicate_caught_by_validation() {
        let inst = shared_item_instance();
        let mut b = ScheduleBuilder::new(&inst);
        b.activate(0).unwrap();
        b.activate(1).unwrap();
        b.supply(0, 0).unwrap();
        b.supply(1, 0).unwrap();
        let schedule = b.into_schedule();
        let errors = validate_schedule(&inst, &schedule).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateItemAcrossEntries);
        assert_eq!(crate::scheduler::score(&inst, &schedule), 5);
    }

    #[test]
    fn test_built_schedule_validates() {
        let inst = shared_item_instance();
        let mut b = ScheduleBuilder::new(&inst);
        b.activate(0).unwrap();
        b.supply(0, 0).unwrap();
        b.supply(0, 1).unwrap();
        b.activate(1).unwrap();
        assert!(validate_schedule(&inst, b.schedule()).is_ok());
    }
}
