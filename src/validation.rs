//! Schedule validation.
//!
//! Stateless re-check of a complete schedule against an instance, used on
//! both builder-produced and solver-decoded schedules. Detects:
//! - Unknown or repeated providers
//! - Activation costs exceeding the budget at any prefix
//! - Unknown items and items outside the provider's catalog
//! - Duplicate items within one entry or across entries
//! - Entries shipping more than `throughput_rate × remaining` items
//!
//! Every violation is collected, not only the first.

use crate::models::{Instance, ItemId, Schedule};
use std::collections::{HashMap, HashSet};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An entry names a provider that doesn't exist.
    UnknownProvider,
    /// A provider is activated more than once.
    RepeatedProvider,
    /// Cumulative activation cost exceeds the time budget.
    BudgetExceeded,
    /// An entry names an item that doesn't exist.
    UnknownItem,
    /// An item is not in the provider's catalog.
    ItemNotInCatalog,
    /// An item appears twice in the same entry.
    DuplicateItemInEntry,
    /// An item appears in more than one entry.
    DuplicateItemAcrossEntries,
    /// An entry ships more items than its capacity.
    CapacityExceeded,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a schedule against an instance.
///
/// Checks, per entry at position k:
/// 1. The provider exists and was not activated earlier
/// 2. Cost of entries `0..=k` fits the budget
/// 3. Every item exists and is in the provider's catalog
/// 4. No item repeats within the entry or appeared in an earlier entry
/// 5. `len(items) ≤ throughput_rate × (budget − cost of entries 0..=k)`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_schedule(instance: &Instance, schedule: &Schedule) -> ValidationResult {
    let mut errors = Vec::new();
    let budget = instance.time_budget();

    let mut activated = HashSet::new();
    let mut owner: HashMap<ItemId, usize> = HashMap::new();
    let mut spent = 0u64;
    let mut budget_reported = false;

    for (k, entry) in schedule.entries.iter().enumerate() {
        let Some(provider) = instance.get_provider(entry.provider) else {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownProvider,
                format!("Entry {k} references unknown provider {}", entry.provider),
            ));
            continue;
        };

        if !activated.insert(provider.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::RepeatedProvider,
                format!("Provider {} is activated more than once", provider.id),
            ));
        }

        spent = spent.saturating_add(provider.activation_cost);
        let remaining = budget.checked_sub(spent);
        if remaining.is_none() && !budget_reported {
            budget_reported = true;
            errors.push(ValidationError::new(
                ValidationErrorKind::BudgetExceeded,
                format!(
                    "Activating provider {} at position {k} brings total cost to {spent}, budget is {budget}",
                    provider.id
                ),
            ));
        }

        let mut in_entry = HashSet::with_capacity(entry.items.len());
        for &item in &entry.items {
            if item >= instance.num_items() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownItem,
                    format!("Provider {} ships unknown item {item}", provider.id),
                ));
                continue;
            }
            if !instance.supplies(provider.id, item) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::ItemNotInCatalog,
                    format!("Item {item} is not in provider {}'s catalog", provider.id),
                ));
            }
            if !in_entry.insert(item) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateItemInEntry,
                    format!("Provider {} ships item {item} twice", provider.id),
                ));
                continue;
            }
            if let Some(&first) = owner.get(&item) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateItemAcrossEntries,
                    format!("Item {item} is shipped by entries {first} and {k}"),
                ));
            } else {
                owner.insert(item, k);
            }
        }

        let capacity = remaining.map(|r| provider.capacity(r)).unwrap_or(0);
        if entry.items.len() as u64 > capacity {
            errors.push(ValidationError::new(
                ValidationErrorKind::CapacityExceeded,
                format!(
                    "Provider {} ships {} items, capacity is {capacity}",
                    provider.id,
                    entry.items.len()
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
