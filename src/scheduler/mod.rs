//! Greedy construction and KPI evaluation.
//!
//! # Algorithm
//!
//! `GreedyScheduler` activates providers in a rule-driven order and fills
//! each with the best items nobody ships yet. It is not optimal, but gives
//! fast baselines and starting orders for the solver-backed planner.
//!
//! # KPI
//!
//! `score` is the distinct-item objective; `ScheduleKpi` adds time usage and
//! per-step diagnostics.

mod greedy;
mod kpi;

pub use greedy::GreedyScheduler;
pub use kpi::{score, ScheduleKpi, StepStats};
