//! Solver-backed planning.
//!
//! Runs a formulation through the gateway, decodes the result, validates
//! the schedule and scores it. A decoded schedule that fails validation is
//! reported as [`PlanError::Invalid`], never returned.

mod window;

pub use window::{WindowSearch, WindowSearchConfig};

use thiserror::Error;

use crate::formulation::{
    fixed_order, joint_order, remaining_score_subset, unlimited_shipping_subset, windowed_joint,
    Built, FormulationError, ScheduleDecoder, Scope,
};
use crate::models::{Instance, ProviderId, Schedule};
use crate::scheduler::score;
use crate::solver::{SolveStatus, SolverError, SolverGateway};
use crate::validation::{validate_schedule, ValidationError};

/// Failure of a planning call.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Formulation(#[from] FormulationError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error("decoded schedule failed validation with {} error(s)", .0.len())]
    Invalid(Vec<ValidationError>),
}

/// A validated, scored schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub schedule: Schedule,
    /// Distinct-item score of `schedule`.
    pub score: u64,
    /// Objective value reported for the formulation.
    pub objective: f64,
    pub status: SolveStatus,
}

/// Formulation → gateway → decode → validate → score.
#[derive(Debug)]
pub struct Planner {
    gateway: SolverGateway,
}

impl Planner {
    pub fn new(gateway: SolverGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &SolverGateway {
        &self.gateway
    }

    /// Best item assignment for providers activated in `order`.
    pub fn plan_fixed_order(
        &self,
        instance: &Instance,
        order: &[ProviderId],
    ) -> Result<PlanOutcome, PlanError> {
        let built = fixed_order(instance, order, Scope::full(instance))?;
        self.run(instance, built)
    }

    /// Best order and assignment for `candidates`, all of which are placed.
    pub fn plan_joint(
        &self,
        instance: &Instance,
        candidates: &[ProviderId],
    ) -> Result<PlanOutcome, PlanError> {
        let built = joint_order(instance, candidates, Scope::full(instance))?;
        self.run(instance, built)
    }

    /// Re-optimizes the positions in `order[lo..hi]` and all assignments.
    pub fn reoptimize_window(
        &self,
        instance: &Instance,
        order: &[ProviderId],
        lo: usize,
        hi: usize,
    ) -> Result<PlanOutcome, PlanError> {
        let built = windowed_joint(instance, order, lo, hi, Scope::full(instance))?;
        self.run(instance, built)
    }

    /// Providers worth activating when shipping is unlimited.
    pub fn select_subset(
        &self,
        instance: &Instance,
        candidates: &[ProviderId],
        time_budget: u64,
    ) -> Result<Vec<ProviderId>, PlanError> {
        let built = unlimited_shipping_subset(instance, candidates, time_budget)?;
        let solution = self.gateway.solve(&built.formulation)?;
        Ok(built.decoder.decode(&solution))
    }

    /// Providers worth activating against caller-supplied remaining scores.
    pub fn select_by_remaining(
        &self,
        instance: &Instance,
        candidates: &[ProviderId],
        scores: &[u64],
        time_budget: u64,
    ) -> Result<Vec<ProviderId>, PlanError> {
        let built = remaining_score_subset(instance, candidates, scores, time_budget)?;
        let solution = self.gateway.solve(&built.formulation)?;
        Ok(built.decoder.decode(&solution))
    }

    fn run(
        &self,
        instance: &Instance,
        built: Built<ScheduleDecoder>,
    ) -> Result<PlanOutcome, PlanError> {
        let solution = self.gateway.solve(&built.formulation)?;
        let schedule = built.decoder.decode(&solution);
        validate_schedule(instance, &schedule).map_err(PlanError::Invalid)?;
        Ok(PlanOutcome {
            score: score(instance, &schedule),
            schedule,
            objective: solution.objective,
            status: solution.status,
        })
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(SolverGateway::from_choice(Default::default()))
    }
}
