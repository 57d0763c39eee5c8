//! Formulation builders.
//!
//! Pure functions that translate a slice of an [`Instance`] into a
//! [`Formulation`] plus a decoder reading a [`Solution`] back into domain
//! terms. Nothing here touches a solver; every call returns a fresh value.
//!
//! | Builder | Decides | Decoder |
//! |---------|---------|---------|
//! | [`fixed_order`] | items per provider, order given | [`ScheduleDecoder`] |
//! | [`unlimited_shipping_subset`] | which providers to activate | [`SubsetDecoder`] |
//! | [`remaining_score_subset`] | same, against caller scores | [`SubsetDecoder`] |
//! | [`joint_order`] | order and items together | [`ScheduleDecoder`] |
//! | [`windowed_joint`] | order inside `[lo, hi)` and all items | [`ScheduleDecoder`] |
//!
//! Items with score 0 never get variables. Preconditions that would make a
//! model infeasible by construction (unknown providers, an order that does
//! not fit the budget) are rejected with [`FormulationError`] instead.

mod fixed_order;
mod joint;
mod subset;

pub use fixed_order::fixed_order;
pub use joint::{big_m, joint_order, windowed_joint};
pub use subset::{remaining_score_subset, unlimited_shipping_subset};

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use crate::lp::{ConstraintKind, Formulation, LinearExpr, Sense, VarId};
use crate::models::{Instance, ItemId, ProviderId, Schedule, ScheduleEntry};
use crate::solver::Solution;

/// Rejected builder input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulationError {
    #[error("provider {0} does not exist")]
    UnknownProvider(ProviderId),
    #[error("provider {0} appears more than once")]
    DuplicateProvider(ProviderId),
    #[error("score vector has {actual} entries, instance has {expected} items")]
    ScoreLengthMismatch { expected: usize, actual: usize },
    #[error("activation costs total {required}, budget is {budget}")]
    BudgetExceeded { required: u64, budget: u64 },
    #[error("window [{lo}, {hi}) is out of range for an order of length {len}")]
    InvalidWindow { lo: usize, hi: usize, len: usize },
}

/// Budget and item scores a builder works against.
///
/// [`Scope::full`] uses the instance's own values; callers modelling an
/// already-spent prefix pass a reduced budget or zeroed-out scores.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub time_budget: u64,
    pub scores: &'a [u64],
}

impl<'a> Scope<'a> {
    pub fn new(time_budget: u64, scores: &'a [u64]) -> Self {
        Self { time_budget, scores }
    }

    /// Whole budget, instance scores.
    pub fn full(instance: &'a Instance) -> Self {
        Self::new(instance.time_budget(), instance.scores())
    }

    fn check(&self, instance: &Instance) -> Result<(), FormulationError> {
        if self.scores.len() != instance.num_items() {
            return Err(FormulationError::ScoreLengthMismatch {
                expected: instance.num_items(),
                actual: self.scores.len(),
            });
        }
        Ok(())
    }
}

/// A formulation with the decoder that reads its solutions.
#[derive(Debug, Clone)]
pub struct Built<D> {
    pub formulation: Formulation,
    pub decoder: D,
}

/// Reads a solved schedule formulation back into a [`Schedule`].
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDecoder {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Provider with a known position.
    Fixed {
        provider: ProviderId,
        ships: Vec<(ItemId, VarId)>,
    },
    /// Providers whose order inside the window is a decision.
    Window {
        positions: usize,
        candidates: Vec<WindowCandidate>,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct WindowCandidate {
    provider: ProviderId,
    position_vars: Vec<VarId>,
    ships: Vec<(ItemId, VarId)>,
}

fn shipped(solution: &Solution, ships: &[(ItemId, VarId)]) -> Vec<ItemId> {
    ships
        .iter()
        .filter(|(_, v)| solution.is_set(*v))
        .map(|(i, _)| *i)
        .collect()
}

impl ScheduleDecoder {
    /// Builds the schedule encoded by `solution`.
    ///
    /// Every provider of the order gets an entry, possibly empty.
    pub fn decode(&self, solution: &Solution) -> Schedule {
        let mut schedule = Schedule::new();
        for segment in &self.segments {
            match segment {
                Segment::Fixed { provider, ships } => {
                    schedule.push(ScheduleEntry::new(*provider, shipped(solution, ships)));
                }
                Segment::Window {
                    positions,
                    candidates,
                } => {
                    for t in 0..*positions {
                        let placed = candidates
                            .iter()
                            .find(|c| c.position_vars.get(t).is_some_and(|&v| solution.is_set(v)));
                        match placed {
                            Some(c) => schedule.push(ScheduleEntry::new(
                                c.provider,
                                shipped(solution, &c.ships),
                            )),
                            None => tracing::debug!(position = t, "window position left empty"),
                        }
                    }
                }
            }
        }
        schedule
    }
}

/// Reads a solved subset formulation back into the activated providers.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsetDecoder {
    activations: Vec<(ProviderId, VarId)>,
}

impl SubsetDecoder {
    /// Activated providers in candidate order.
    pub fn decode(&self, solution: &Solution) -> Vec<ProviderId> {
        self.activations
            .iter()
            .filter(|(_, v)| solution.is_set(*v))
            .map(|(p, _)| *p)
            .collect()
    }
}

fn check_providers(instance: &Instance, providers: &[ProviderId]) -> Result<(), FormulationError> {
    let mut seen = HashSet::with_capacity(providers.len());
    for &p in providers {
        if p >= instance.num_providers() {
            return Err(FormulationError::UnknownProvider(p));
        }
        if !seen.insert(p) {
            return Err(FormulationError::DuplicateProvider(p));
        }
    }
    Ok(())
}

fn total_cost(instance: &Instance, providers: &[ProviderId]) -> u64 {
    providers
        .iter()
        .map(|&p| instance.provider(p).activation_cost)
        .sum()
}

/// Coverage and shipping variables shared by the schedule formulations.
///
/// Adds `cover_i` in `[0, 1]` for every scoring item some provider carries,
/// `ship_p_i` binaries, the at-most-once and use rows, and the objective.
/// Returns the ship variables per provider, in `providers` order.
fn add_item_assignment(
    f: &mut Formulation,
    instance: &Instance,
    providers: &[ProviderId],
    scores: &[u64],
) -> Vec<Vec<(ItemId, VarId)>> {
    let mut carriers: BTreeMap<ItemId, Vec<ProviderId>> = BTreeMap::new();
    for &p in providers {
        for &i in &instance.provider(p).catalog {
            if scores[i] > 0 {
                carriers.entry(i).or_default().push(p);
            }
        }
    }

    let covers: BTreeMap<ItemId, VarId> = carriers
        .keys()
        .map(|&i| (i, f.add_continuous(format!("cover_{i}"), 0.0, 1.0)))
        .collect();

    let mut by_item: BTreeMap<ItemId, Vec<VarId>> = BTreeMap::new();
    let ships: Vec<Vec<(ItemId, VarId)>> = providers
        .iter()
        .map(|&p| {
            instance
                .provider(p)
                .catalog
                .iter()
                .filter(|&&i| scores[i] > 0)
                .map(|&i| {
                    let v = f.add_binary(format!("ship_{p}_{i}"));
                    by_item.entry(i).or_default().push(v);
                    (i, v)
                })
                .collect()
        })
        .collect();

    let mut objective = LinearExpr::zero();
    for (&i, &cover) in &covers {
        let vars = by_item.get(&i).map(Vec::as_slice).unwrap_or(&[]);
        f.add_constraint(
            ConstraintKind::ItemOnce,
            LinearExpr::sum_of(vars.iter().copied()),
            Sense::Le,
            1.0,
        );
        f.add_constraint(
            ConstraintKind::ItemUse,
            LinearExpr::from_var(cover, 1.0).sub(LinearExpr::sum_of(vars.iter().copied())),
            Sense::Le,
            0.0,
        );
        objective.add_term(cover, scores[i] as f64);
    }
    f.maximize(objective);
    ships
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Provider;
    use crate::solver::SolveStatus;

    /// Three items, two providers sharing item 1.
    pub(crate) fn small_instance() -> Instance {
        Instance::new(
            6,
            vec![5, 3, 0],
            vec![
                Provider::new(0, 2, 1).with_catalog(vec![0, 1, 2]),
                Provider::new(1, 1, 2).with_catalog(vec![1]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_scope_checks_length() {
        let inst = small_instance();
        assert!(Scope::full(&inst).check(&inst).is_ok());
        let short = [1u64];
        assert_eq!(
            Scope::new(6, &short).check(&inst),
            Err(FormulationError::ScoreLengthMismatch {
                expected: 3,
                actual: 1
            })
        );
    }

    #[test]
    fn test_check_providers() {
        let inst = small_instance();
        assert!(check_providers(&inst, &[1, 0]).is_ok());
        assert_eq!(
            check_providers(&inst, &[0, 0]),
            Err(FormulationError::DuplicateProvider(0))
        );
        assert_eq!(
            check_providers(&inst, &[7]),
            Err(FormulationError::UnknownProvider(7))
        );
    }

    #[test]
    fn test_item_assignment_skips_zero_scores() {
        let inst = small_instance();
        let mut f = Formulation::new("t");
        let ships = add_item_assignment(&mut f, &inst, &[0, 1], inst.scores());
        // covers for items 0 and 1, ships 0_0 0_1 1_1
        assert_eq!(f.num_variables(), 5);
        assert_eq!(ships[0].len(), 2);
        assert_eq!(ships[1].len(), 1);
        assert!(f.variables().iter().all(|v| v.name != "cover_2"));
        // once + use per covered item
        assert_eq!(f.num_constraints(), 4);
    }

    #[test]
    fn test_schedule_decoder_threshold() {
        let inst = small_instance();
        let mut f = Formulation::new("t");
        let ships = add_item_assignment(&mut f, &inst, &[0], inst.scores());
        let decoder = ScheduleDecoder {
            segments: vec![Segment::Fixed {
                provider: 0,
                ships: ships[0].clone(),
            }],
        };
        let mut values = vec![0.0; f.num_variables()];
        values[ships[0][0].1.index()] = 0.9999;
        values[ships[0][1].1.index()] = 0.0001;
        let schedule = decoder.decode(&Solution::from_values(&f, SolveStatus::Optimal, values));
        assert_eq!(schedule.entries[0].items, vec![ships[0][0].0]);
    }

    #[test]
    fn test_subset_decoder() {
        let mut f = Formulation::new("t");
        let a = f.add_binary("a");
        let b = f.add_binary("b");
        let decoder = SubsetDecoder {
            activations: vec![(3, a), (1, b)],
        };
        let s = Solution::from_values(&f, SolveStatus::Optimal, vec![1.0, 0.2]);
        assert_eq!(decoder.decode(&s), vec![3]);
    }
}
