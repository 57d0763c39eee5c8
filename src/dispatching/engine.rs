//! Lexicographic provider ordering.
//!
//! Every candidate gets a key with one rule score per rule, in the order
//! the rules were added. Candidates are sorted by key, so a later rule only
//! matters among providers the earlier rules cannot tell apart.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{OrderingContext, OrderingRule, RuleScore};
use crate::models::{Instance, ProviderId};

/// Rule scores closer than this count as equal.
const SCORE_EPS: f64 = 1e-9;

/// How providers with equal keys are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Keep the candidate order (the sort is stable).
    #[default]
    InputOrder,
    /// Lower provider id first.
    ById,
}

/// Sorts candidate providers into an activation order.
///
/// # Example
/// ```
/// use u_provision::dispatching::{OrderingContext, RuleEngine, TieBreaker};
/// use u_provision::dispatching::rules;
/// use u_provision::models::{Instance, Provider};
///
/// let instance = Instance::new(
///     4,
///     vec![5, 5],
///     vec![
///         Provider::new(0, 2, 1).with_catalog(vec![0]),
///         Provider::new(1, 1, 3).with_catalog(vec![1]),
///     ],
/// ).unwrap();
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::ShortestActivation)
///     .with_tie_breaker(TieBreaker::ById);
/// let context = OrderingContext::new(&instance);
/// assert_eq!(engine.order(&instance, &[0, 1], &context), vec![1, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn OrderingRule>>,
    tie_breaker: TieBreaker,
}

impl RuleEngine {
    /// Creates an engine with no rules; it keeps the candidate order.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::InputOrder,
        }
    }

    /// Appends a rule; it only decides between providers that all earlier
    /// rules score alike.
    pub fn with_rule<R: OrderingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Sets how fully tied providers are ordered.
    pub fn with_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Activation order of `candidates`, earliest first.
    ///
    /// Ids the instance does not know are dropped.
    pub fn order(
        &self,
        instance: &Instance,
        candidates: &[ProviderId],
        context: &OrderingContext<'_>,
    ) -> Vec<ProviderId> {
        let mut keyed: Vec<(ProviderId, Vec<RuleScore>)> = candidates
            .iter()
            .filter_map(|&p| match instance.get_provider(p) {
                Some(provider) => Some((
                    p,
                    self.rules
                        .iter()
                        .map(|r| r.evaluate(provider, context))
                        .collect(),
                )),
                None => {
                    tracing::warn!(provider = p, "unknown provider left out of ordering");
                    None
                }
            })
            .collect();

        keyed.sort_by(|(pa, ka), (pb, kb)| {
            compare_keys(ka, kb).then_with(|| match self.tie_breaker {
                TieBreaker::InputOrder => Ordering::Equal,
                TieBreaker::ById => pa.cmp(pb),
            })
        });
        keyed.into_iter().map(|(p, _)| p).collect()
    }
}

fn compare_keys(a: &[RuleScore], b: &[RuleScore]) -> Ordering {
    a.iter()
        .zip(b)
        .find(|(x, y)| (*x - *y).abs() > SCORE_EPS)
        .map_or(Ordering::Equal, |(x, y)| x.total_cmp(y))
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}
