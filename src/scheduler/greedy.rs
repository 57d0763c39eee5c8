//! Greedy constructor on top of the incremental builder.
//!
//! # Algorithm
//!
//! 1. Order providers with the rule engine, or take the given order.
//! 2. Activate each in turn; a provider that no longer fits the budget is
//!    skipped.
//! 3. Fill the provider with its highest-score catalog items that no
//!    earlier provider ships, until its capacity runs out.
//!
//! # Complexity
//! O(Σ catalog) after ordering.

use crate::builder::ScheduleBuilder;
use crate::dispatching::{OrderingContext, RuleEngine};
use crate::models::{Instance, ProviderId, Schedule};

/// Greedy schedule constructor.
///
/// # Example
///
/// ```
/// use u_provision::models::{Instance, Provider};
/// use u_provision::scheduler::{score, GreedyScheduler};
///
/// let instance = Instance::new(
///     2,
///     vec![10, 1],
///     vec![Provider::new(0, 1, 5).with_catalog(vec![0, 1])],
/// ).unwrap();
///
/// let schedule = GreedyScheduler::new().schedule(&instance);
/// assert_eq!(score(&instance, &schedule), 11);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GreedyScheduler {
    rule_engine: Option<RuleEngine>,
}

impl GreedyScheduler {
    /// Creates a scheduler that keeps provider id order.
    pub fn new() -> Self {
        Self { rule_engine: None }
    }

    /// Sets a rule engine for provider ordering.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = Some(engine);
        self
    }

    /// Orders all providers and builds a schedule.
    pub fn schedule(&self, instance: &Instance) -> Schedule {
        let order = self.order(instance);
        self.schedule_order(instance, &order)
    }

    /// Provider order used by [`schedule`](Self::schedule).
    pub fn order(&self, instance: &Instance) -> Vec<ProviderId> {
        let ids: Vec<ProviderId> = (0..instance.num_providers()).collect();
        match &self.rule_engine {
            Some(engine) => engine.order(instance, &ids, &OrderingContext::new(instance)),
            None => ids,
        }
    }

    /// Builds a schedule activating providers in `order`.
    pub fn schedule_order(&self, instance: &Instance, order: &[ProviderId]) -> Schedule {
        let mut builder = ScheduleBuilder::new(instance);

        for &p in order {
            if builder.activate(p).is_err() {
                continue;
            }
            // catalogs are sorted by descending score
            for &item in &instance.provider(p).catalog {
                if builder.remaining_capacity(p) == 0 {
                    break;
                }
                if instance.score(item) == 0 || builder.is_supplied(item) {
                    continue;
                }
                if builder.supply(p, item).is_err() {
                    break;
                }
            }
        }

        builder.into_schedule()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules;
    use crate::models::Provider;
    use crate::scheduler::score;
    use crate::validation::validate_schedule;

    fn instance() -> Instance {
        Instance::new(
            6,
            vec![1, 7, 5, 2, 0],
            vec![
                Provider::new(0, 4, 1).with_catalog(vec![0, 1, 4]),
                Provider::new(1, 1, 1).with_catalog(vec![1, 2, 3]),
                Provider::new(2, 3, 2).with_catalog(vec![3]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_id_order() {
        let inst = instance();
        let s = GreedyScheduler::new().schedule(&inst);
        // p0 (rem 2) ships 1 and 0; p1 (rem 1) ships 2; p2 does not fit
        assert_eq!(s.provider_order(), vec![0, 1]);
        assert_eq!(s.entries[0].items, vec![1, 0]);
        assert_eq!(s.entries[1].items, vec![2]);
        assert_eq!(score(&inst, &s), 13);
        assert!(validate_schedule(&inst, &s).is_ok());
    }

    #[test]
    fn test_rule_engine_order() {
        let inst = instance();
        let scheduler = GreedyScheduler::new()
            .with_rule_engine(RuleEngine::new().with_rule(rules::ShortestActivation));
        assert_eq!(scheduler.order(&inst), vec![1, 2, 0]);
        let s = scheduler.schedule(&inst);
        // p1 (rem 5) ships 1, 2, 3; p2 (rem 2) finds nothing new; p0 does not fit
        assert_eq!(s.provider_order(), vec![1, 2]);
        assert_eq!(s.entries[0].items, vec![1, 2, 3]);
        assert!(s.entries[1].items.is_empty());
        assert_eq!(score(&inst, &s), 14);
        assert!(validate_schedule(&inst, &s).is_ok());
    }

    #[test]
    fn test_zero_score_items_skipped() {
        let inst = Instance::new(
            5,
            vec![0, 0],
            vec![Provider::new(0, 1, 3).with_catalog(vec![0, 1])],
        )
        .unwrap();
        let s = GreedyScheduler::new().schedule(&inst);
        assert_eq!(s.len(), 1);
        assert_eq!(s.assigned_count(), 0);
    }
}
