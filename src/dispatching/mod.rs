//! Ordering rules and rule engine for provider activation.
//!
//! A heuristic source of candidate orders: rules score providers, the
//! engine sorts them, and the result feeds a formulation builder or the
//! greedy scheduler.
//!
//! # Usage
//!
//! ```
//! use u_provision::dispatching::{OrderingContext, RuleEngine};
//! use u_provision::dispatching::rules;
//! use u_provision::models::{Instance, Provider};
//!
//! let instance = Instance::new(
//!     5,
//!     vec![3, 1],
//!     vec![
//!         Provider::new(0, 3, 1).with_catalog(vec![0]),
//!         Provider::new(1, 1, 1).with_catalog(vec![1]),
//!     ],
//! ).unwrap();
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::ShortestActivation)
//!     .with_rule(rules::CatalogValue);
//!
//! let context = OrderingContext::new(&instance);
//! assert_eq!(engine.order(&instance, &[0, 1], &context), vec![1, 0]);
//! ```

mod context;
mod engine;
pub mod rules;

pub use context::OrderingContext;
pub use engine::{RuleEngine, TieBreaker};

use crate::models::Provider;
use std::fmt::Debug;

/// Score returned by an ordering rule.
///
/// Lower scores = earlier activation.
pub type RuleScore = f64;

/// A rule that scores a provider for activation order.
///
/// # Score Convention
/// **Lower score = activated earlier.**
pub trait OrderingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SAT").
    fn name(&self) -> &'static str;

    /// Scores `provider` under the current context.
    fn evaluate(&self, provider: &Provider, context: &OrderingContext<'_>) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
