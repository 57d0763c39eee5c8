//! Provider model.
//!
//! A provider is activated once, consuming `activation_cost` time units of
//! the global budget. From then on it can ship up to `throughput_rate` items
//! per remaining time unit, drawn from its catalog.

use serde::{Deserialize, Serialize};

use super::ItemId;

/// Provider identifier (`0 <= id < num_providers`).
pub type ProviderId = usize;

/// A provider of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Provider identifier (equals its position in the instance).
    pub id: ProviderId,
    /// Time units consumed by activation (positive).
    pub activation_cost: u64,
    /// Items shipped per remaining time unit (positive).
    pub throughput_rate: u64,
    /// Items this provider can supply, without duplicates.
    pub catalog: Vec<ItemId>,
}

impl Provider {
    /// Creates a provider with an empty catalog.
    pub fn new(id: ProviderId, activation_cost: u64, throughput_rate: u64) -> Self {
        Self {
            id,
            activation_cost,
            throughput_rate,
            catalog: Vec::new(),
        }
    }

    /// Sets the catalog.
    pub fn with_catalog(mut self, catalog: Vec<ItemId>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Shipping capacity when `remaining` time units are left after activation.
    #[inline]
    pub fn capacity(&self, remaining: u64) -> u64 {
        self.throughput_rate.saturating_mul(remaining)
    }

    /// Number of items in the catalog.
    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_builder() {
        let p = Provider::new(3, 2, 5).with_catalog(vec![1, 4, 7]);
        assert_eq!(p.id, 3);
        assert_eq!(p.activation_cost, 2);
        assert_eq!(p.throughput_rate, 5);
        assert_eq!(p.catalog_len(), 3);
    }

    #[test]
    fn test_provider_capacity() {
        let p = Provider::new(0, 1, 5);
        assert_eq!(p.capacity(0), 0);
        assert_eq!(p.capacity(3), 15);
        assert_eq!(Provider::new(0, 1, u64::MAX).capacity(2), u64::MAX);
    }
}
