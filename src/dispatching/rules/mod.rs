//! Built-in ordering rules.
//!
//! | Rule | Name | Activates first |
//! |------|------|-----------------|
//! | [`ShortestActivation`] | SAT | lowest activation cost |
//! | [`HighestThroughput`] | HTR | highest throughput rate |
//! | [`CatalogValue`] | CV | largest total catalog score |
//! | [`ValuePerActivation`] | VPA | most reachable score per activation unit |
//!
//! # Score Convention
//! All rules return lower scores for providers that should go first.

use super::{OrderingContext, OrderingRule, RuleScore};
use crate::models::Provider;

/// Shortest Activation Time.
///
/// Cheap providers start shipping early and leave more budget behind.
#[derive(Debug, Clone, Copy)]
pub struct ShortestActivation;

impl OrderingRule for ShortestActivation {
    fn name(&self) -> &'static str {
        "SAT"
    }

    fn evaluate(&self, provider: &Provider, _context: &OrderingContext<'_>) -> RuleScore {
        provider.activation_cost as f64
    }

    fn description(&self) -> &'static str {
        "Shortest Activation Time"
    }
}

/// Highest Throughput Rate.
#[derive(Debug, Clone, Copy)]
pub struct HighestThroughput;

impl OrderingRule for HighestThroughput {
    fn name(&self) -> &'static str {
        "HTR"
    }

    fn evaluate(&self, provider: &Provider, _context: &OrderingContext<'_>) -> RuleScore {
        -(provider.throughput_rate as f64)
    }

    fn description(&self) -> &'static str {
        "Highest Throughput Rate"
    }
}

/// Catalog Value.
///
/// Total score of the provider's catalog under `context.scores`, ignoring
/// capacity.
#[derive(Debug, Clone, Copy)]
pub struct CatalogValue;

impl OrderingRule for CatalogValue {
    fn name(&self) -> &'static str {
        "CV"
    }

    fn evaluate(&self, provider: &Provider, context: &OrderingContext<'_>) -> RuleScore {
        let value: u64 = provider.catalog.iter().map(|&i| context.score(i)).sum();
        -(value as f64)
    }

    fn description(&self) -> &'static str {
        "Catalog Value"
    }
}

/// Value Per Activation unit.
///
/// If the provider were activated first, it could ship
/// `k = throughput_rate × (budget − activation_cost)` items. The rule takes
/// the best `k` catalog scores and divides by the activation cost. A
/// provider that does not fit the budget scores 0.
#[derive(Debug, Clone, Copy)]
pub struct ValuePerActivation;

impl OrderingRule for ValuePerActivation {
    fn name(&self) -> &'static str {
        "VPA"
    }

    fn evaluate(&self, provider: &Provider, context: &OrderingContext<'_>) -> RuleScore {
        let Some(remaining) = context.time_budget.checked_sub(provider.activation_cost) else {
            return 0.0;
        };
        let k = usize::try_from(provider.capacity(remaining)).unwrap_or(usize::MAX);

        let mut scores: Vec<u64> = provider.catalog.iter().map(|&i| context.score(i)).collect();
        scores.sort_unstable_by(|a, b| b.cmp(a));
        let reachable: u64 = scores.into_iter().take(k).sum();

        -(reachable as f64 / provider.activation_cost as f64)
    }

    fn description(&self) -> &'static str {
        "Value Per Activation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Instance;

    fn instance() -> Instance {
        Instance::new(
            4,
            vec![9, 6, 3],
            vec![
                Provider::new(0, 2, 1).with_catalog(vec![0, 1, 2]),
                Provider::new(1, 5, 1).with_catalog(vec![0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_simple_rules() {
        let inst = instance();
        let ctx = OrderingContext::new(&inst);
        let p = inst.provider(0);
        assert_eq!(ShortestActivation.evaluate(p, &ctx), 2.0);
        assert_eq!(HighestThroughput.evaluate(p, &ctx), -1.0);
        assert_eq!(CatalogValue.evaluate(p, &ctx), -18.0);
    }

    #[test]
    fn test_catalog_value_uses_context_scores() {
        let inst = instance();
        let remaining = [0u64, 6, 3];
        let ctx = OrderingContext::new(&inst).with_scores(&remaining);
        assert_eq!(CatalogValue.evaluate(inst.provider(0), &ctx), -9.0);
    }

    #[test]
    fn test_value_per_activation_caps_by_capacity() {
        let inst = instance();
        let ctx = OrderingContext::new(&inst);
        // remaining 2, rate 1: best two items 9 + 6 over cost 2
        assert!((ValuePerActivation.evaluate(inst.provider(0), &ctx) + 7.5).abs() < 1e-10);
    }

    #[test]
    fn test_value_per_activation_over_budget() {
        let inst = instance();
        let ctx = OrderingContext::new(&inst);
        assert_eq!(ValuePerActivation.evaluate(inst.provider(1), &ctx), 0.0);
        let ctx = ctx.with_time_budget(6);
        // remaining 1, one item of score 9 over cost 5
        assert!((ValuePerActivation.evaluate(inst.provider(1), &ctx) + 1.8).abs() < 1e-10);
    }

    #[test]
    fn test_names() {
        assert_eq!(ShortestActivation.name(), "SAT");
        assert_eq!(ValuePerActivation.description(), "Value Per Activation");
    }
}
