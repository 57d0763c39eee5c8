//! Windowed local search over an activation order.
//!
//! Starting from a fixed-order plan, repeatedly re-optimizes contiguous
//! windows of the order with the windowed joint formulation. Window starts
//! are visited in random order; the first strictly better schedule is
//! adopted and the round restarts from its order. The search ends after a
//! number of rounds without gain, or at `max_rounds`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::{PlanError, PlanOutcome, Planner};
use crate::models::{Instance, ProviderId};

/// Window search parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSearchConfig {
    /// Providers per window.
    pub window: usize,
    /// Hard cap on rounds.
    pub max_rounds: usize,
    /// Consecutive rounds without improvement before stopping.
    pub rounds_without_gain_stop: usize,
    /// Seed for the window visiting order.
    pub seed: u64,
}

impl Default for WindowSearchConfig {
    fn default() -> Self {
        Self {
            window: 4,
            max_rounds: 50,
            rounds_without_gain_stop: 1,
            seed: 42,
        }
    }
}

impl WindowSearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_rounds_without_gain_stop(mut self, rounds: usize) -> Self {
        self.rounds_without_gain_stop = rounds;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Local search driver.
#[derive(Debug)]
pub struct WindowSearch<'p> {
    planner: &'p Planner,
    config: WindowSearchConfig,
}

impl<'p> WindowSearch<'p> {
    pub fn new(planner: &'p Planner, config: WindowSearchConfig) -> Self {
        Self { planner, config }
    }

    pub fn config(&self) -> &WindowSearchConfig {
        &self.config
    }

    /// Improves the plan for `order`.
    ///
    /// # Errors
    /// Fails if the initial fixed-order plan fails. A window whose solve
    /// fails afterwards is skipped.
    pub fn run(&self, instance: &Instance, order: &[ProviderId]) -> Result<PlanOutcome, PlanError> {
        let mut best = self.planner.plan_fixed_order(instance, order)?;
        let mut current: Vec<ProviderId> = order.to_vec();
        let n = current.len();
        let width = self.config.window.clamp(1, n.max(1));
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let mut rounds = 0usize;
        let mut rounds_no_gain = 0usize;
        while rounds < self.config.max_rounds
            && rounds_no_gain < self.config.rounds_without_gain_stop
            && n > 1
        {
            rounds += 1;
            let mut starts: Vec<usize> = (0..=n - width).collect();
            starts.shuffle(&mut rng);

            let mut improved = false;
            for lo in starts {
                let hi = lo + width;
                let outcome = match self.planner.reoptimize_window(instance, &current, lo, hi) {
                    Ok(outcome) => outcome,
                    Err(PlanError::Formulation(e)) => return Err(PlanError::Formulation(e)),
                    Err(e) => {
                        tracing::warn!(lo, hi, error = %e, "window skipped");
                        continue;
                    }
                };
                if outcome.score > best.score {
                    tracing::info!(
                        round = rounds,
                        lo,
                        hi,
                        from = best.score,
                        to = outcome.score,
                        "window improved schedule"
                    );
                    current = outcome.schedule.provider_order();
                    best = outcome;
                    improved = true;
                    break;
                }
            }

            if improved {
                rounds_no_gain = 0;
            } else {
                rounds_no_gain += 1;
            }
        }

        tracing::debug!(rounds, score = best.score, "window search finished");
        Ok(best)
    }
}
