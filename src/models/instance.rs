//! Problem instance model.
//!
//! An instance is read once and never mutated. Loading derives the
//! item → providers index and orders every catalog by descending item
//! score (ties by item id), so consumers that walk a catalog front to back
//! see the most valuable items first.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use super::{Item, ItemId, Provider, ProviderId};

/// Malformed-input errors raised while loading an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    /// A provider's id does not match its position.
    #[error("provider at position {position} has id {id}")]
    ProviderIdMismatch { position: usize, id: ProviderId },
    /// A provider has a zero activation cost.
    #[error("provider {0} has zero activation cost")]
    ZeroActivationCost(ProviderId),
    /// A provider has a zero throughput rate.
    #[error("provider {0} has zero throughput rate")]
    ZeroThroughput(ProviderId),
    /// A catalog references an item id outside `0..num_items`.
    #[error("provider {provider} lists item {item}, but there are only {num_items} items")]
    ItemOutOfRange {
        provider: ProviderId,
        item: ItemId,
        num_items: usize,
    },
    /// A catalog lists the same item twice.
    #[error("provider {provider} lists item {item} more than once")]
    DuplicateCatalogItem { provider: ProviderId, item: ItemId },
}

/// Serialized form of an instance.
///
/// Provider ids are implied by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceData {
    /// Global time budget.
    pub time_budget: u64,
    /// Score per item id.
    pub scores: Vec<u64>,
    /// Providers in id order.
    pub providers: Vec<ProviderData>,
}

/// Serialized form of a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderData {
    pub activation_cost: u64,
    pub throughput_rate: u64,
    pub catalog: Vec<ItemId>,
}

/// An immutable problem instance.
///
/// # Example
/// ```
/// use u_provision::models::{Instance, Provider};
///
/// let instance = Instance::new(
///     2,
///     vec![10, 1],
///     vec![Provider::new(0, 1, 5).with_catalog(vec![1, 0])],
/// )
/// .unwrap();
/// assert_eq!(instance.num_items(), 2);
/// assert_eq!(instance.providers_of(0), &[0]);
/// // catalogs are ordered by descending score
/// assert_eq!(instance.provider(0).catalog, vec![0, 1]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "InstanceData", into = "InstanceData")]
pub struct Instance {
    time_budget: u64,
    items: Vec<Item>,
    providers: Vec<Provider>,
    item_to_providers: Vec<Vec<ProviderId>>,
    catalog_sets: Vec<HashSet<ItemId>>,
    scores: Vec<u64>,
}

impl Instance {
    /// Builds an instance and its derived indices.
    ///
    /// # Errors
    /// Returns an [`InstanceError`] on the first inconsistency found.
    pub fn new(
        time_budget: u64,
        scores: Vec<u64>,
        mut providers: Vec<Provider>,
    ) -> Result<Self, InstanceError> {
        let num_items = scores.len();
        let mut item_to_providers: Vec<Vec<ProviderId>> = vec![Vec::new(); num_items];
        let mut catalog_sets = Vec::with_capacity(providers.len());

        for (position, provider) in providers.iter_mut().enumerate() {
            if provider.id != position {
                return Err(InstanceError::ProviderIdMismatch {
                    position,
                    id: provider.id,
                });
            }
            if provider.activation_cost == 0 {
                return Err(InstanceError::ZeroActivationCost(provider.id));
            }
            if provider.throughput_rate == 0 {
                return Err(InstanceError::ZeroThroughput(provider.id));
            }

            let mut set = HashSet::with_capacity(provider.catalog.len());
            for &item in &provider.catalog {
                if item >= num_items {
                    return Err(InstanceError::ItemOutOfRange {
                        provider: provider.id,
                        item,
                        num_items,
                    });
                }
                if !set.insert(item) {
                    return Err(InstanceError::DuplicateCatalogItem {
                        provider: provider.id,
                        item,
                    });
                }
                item_to_providers[item].push(provider.id);
            }

            provider
                .catalog
                .sort_by(|&a, &b| scores[b].cmp(&scores[a]).then(a.cmp(&b)));
            catalog_sets.push(set);
        }

        let items = scores
            .iter()
            .enumerate()
            .map(|(id, &score)| Item::new(id, score))
            .collect();

        Ok(Self {
            time_budget,
            items,
            providers,
            item_to_providers,
            catalog_sets,
            scores,
        })
    }

    /// Global time budget.
    #[inline]
    pub fn time_budget(&self) -> u64 {
        self.time_budget
    }

    /// Number of items.
    #[inline]
    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    /// Number of providers.
    #[inline]
    pub fn num_providers(&self) -> usize {
        self.providers.len()
    }

    /// All items, indexed by id.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// All providers, indexed by id.
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Item scores, indexed by item id.
    pub fn scores(&self) -> &[u64] {
        &self.scores
    }

    /// Provider by id.
    ///
    /// # Panics
    /// Panics if `id` is out of range.
    pub fn provider(&self, id: ProviderId) -> &Provider {
        &self.providers[id]
    }

    /// Provider by id, if it exists.
    pub fn get_provider(&self, id: ProviderId) -> Option<&Provider> {
        self.providers.get(id)
    }

    /// Score of an item (0 for unknown ids).
    pub fn score(&self, item: ItemId) -> u64 {
        self.scores.get(item).copied().unwrap_or(0)
    }

    /// Providers whose catalog contains `item`, in id order.
    pub fn providers_of(&self, item: ItemId) -> &[ProviderId] {
        self.item_to_providers
            .get(item)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `provider` can supply `item`.
    pub fn supplies(&self, provider: ProviderId, item: ItemId) -> bool {
        self.catalog_sets
            .get(provider)
            .is_some_and(|set| set.contains(&item))
    }

    /// Sum of all item scores.
    pub fn total_score(&self) -> u64 {
        self.scores.iter().sum()
    }
}

impl TryFrom<InstanceData> for Instance {
    type Error = InstanceError;

    fn try_from(data: InstanceData) -> Result<Self, Self::Error> {
        let providers = data
            .providers
            .into_iter()
            .enumerate()
            .map(|(id, p)| {
                Provider::new(id, p.activation_cost, p.throughput_rate).with_catalog(p.catalog)
            })
            .collect();
        Instance::new(data.time_budget, data.scores, providers)
    }
}

impl From<Instance> for InstanceData {
    fn from(instance: Instance) -> Self {
        Self {
            time_budget: instance.time_budget,
            scores: instance.scores,
            providers: instance
                .providers
                .into_iter()
                .map(|p| ProviderData {
                    activation_cost: p.activation_cost,
                    throughput_rate: p.throughput_rate,
                    catalog: p.catalog,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Instance {
        Instance::new(
            7,
            vec![1, 2, 3, 6, 5, 4],
            vec![
                Provider::new(0, 2, 2).with_catalog(vec![0, 1, 2, 3, 4]),
                Provider::new(1, 3, 1).with_catalog(vec![3, 2, 5, 0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_item_to_providers_index() {
        let inst = sample();
        assert_eq!(inst.providers_of(0), &[0, 1]);
        assert_eq!(inst.providers_of(1), &[0]);
        assert_eq!(inst.providers_of(5), &[1]);
        assert!(inst.providers_of(99).is_empty());
    }

    #[test]
    fn test_catalog_sorted_by_score() {
        let inst = sample();
        assert_eq!(inst.provider(0).catalog, vec![3, 4, 2, 1, 0]);
        assert_eq!(inst.provider(1).catalog, vec![3, 5, 2, 0]);
    }

    #[test]
    fn test_catalog_ties_by_id() {
        let inst = Instance::new(
            1,
            vec![4, 4, 4],
            vec![Provider::new(0, 1, 1).with_catalog(vec![2, 0, 1])],
        )
        .unwrap();
        assert_eq!(inst.provider(0).catalog, vec![0, 1, 2]);
    }

    #[test]
    fn test_supplies() {
        let inst = sample();
        assert!(inst.supplies(0, 4));
        assert!(!inst.supplies(1, 4));
        assert!(!inst.supplies(9, 0));
    }

    #[test]
    fn test_item_out_of_range() {
        let err = Instance::new(
            5,
            vec![1, 1],
            vec![Provider::new(0, 1, 1).with_catalog(vec![0, 2])],
        )
        .unwrap_err();
        assert_eq!(
            err,
            InstanceError::ItemOutOfRange {
                provider: 0,
                item: 2,
                num_items: 2
            }
        );
    }

    #[test]
    fn test_duplicate_catalog_item() {
        let err = Instance::new(
            5,
            vec![1, 1],
            vec![Provider::new(0, 1, 1).with_catalog(vec![1, 1])],
        )
        .unwrap_err();
        assert!(matches!(err, InstanceError::DuplicateCatalogItem { item: 1, .. }));
    }

    #[test]
    fn test_zero_cost_and_rate_rejected() {
        let err = Instance::new(5, vec![1], vec![Provider::new(0, 0, 1)]).unwrap_err();
        assert_eq!(err, InstanceError::ZeroActivationCost(0));
        let err = Instance::new(5, vec![1], vec![Provider::new(0, 1, 0)]).unwrap_err();
        assert_eq!(err, InstanceError::ZeroThroughput(0));
    }

    #[test]
    fn test_provider_id_mismatch() {
        let err = Instance::new(5, vec![1], vec![Provider::new(4, 1, 1)]).unwrap_err();
        assert_eq!(err, InstanceError::ProviderIdMismatch { position: 0, id: 4 });
    }

    #[test]
    fn test_serde_roundtrip() {
        let inst = sample();
        let json = serde_json::to_string(&inst).unwrap();
        let back: Instance = serde_json::from_str(&json).unwrap();
        assert_eq!(back.time_budget(), 7);
        assert_eq!(back.scores(), inst.scores());
        assert_eq!(back.providers(), inst.providers());
        assert_eq!(back.providers_of(0), &[0, 1]);
    }

    #[test]
    fn test_deserialize_rejects_malformed() {
        let json = r#"{"time_budget":3,"scores":[1],"providers":[{"activation_cost":1,"throughput_rate":1,"catalog":[3]}]}"#;
        assert!(serde_json::from_str::<Instance>(json).is_err());
    }

    #[test]
    fn test_total_score() {
        assert_eq!(sample().total_score(), 21);
    }
}
