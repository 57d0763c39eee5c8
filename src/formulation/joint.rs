//! (d)/(e) Joint order-and-assignment optimization.
//!
//! Inside the window `[lo, hi)` of an order, provider positions are
//! decisions:
//!
//! ```text
//! x[p,t]  binary     provider p sits at window position t
//! T[t]    in [0, W]  remaining time after the provider at position t
//! R[p]    in [0, W]  remaining time after provider p's own activation
//!
//! sum_t x[p,t] = 1                               every p
//! sum_p x[p,t] = 1                               every t
//! T[0]            + sum_p cost[p] x[p,0] = W
//! T[t] - T[t-1]   + sum_p cost[p] x[p,t] = 0     t > 0
//! R[p] - T[t] + M x[p,t] <= M                    every p, t
//! sum_i ship[p,i] - rate[p] R[p] <= 0            every p
//! ```
//!
//! `W` is the budget left once the fixed prefix `order[..lo]` is paid for.
//! Providers outside the window keep their position and get a constant
//! capacity. Item coverage is re-decided for every provider of the order.

use super::{
    add_item_assignment, check_providers, total_cost, Built, FormulationError, ScheduleDecoder,
    Scope, Segment, WindowCandidate,
};
use crate::lp::{ConstraintKind, Formulation, LinearExpr, Sense, VarId};
use crate::models::{Instance, ProviderId};

/// Big-M constant for the position/remaining-time link.
///
/// With `x[p,t] = 0` the row reads `R[p] - T[t] <= M`. Both variables lie in
/// `[0, W]`, so the largest legitimate gap is `W` and `M = W` never cuts off
/// a feasible assignment. A smaller constant would.
pub fn big_m(window_budget: u64) -> f64 {
    window_budget as f64
}

/// (d) Full joint problem over `candidates`: the whole order is one window.
///
/// Every candidate is placed, so their activation costs must fit the budget.
pub fn joint_order(
    instance: &Instance,
    candidates: &[ProviderId],
    scope: Scope<'_>,
) -> Result<Built<ScheduleDecoder>, FormulationError> {
    windowed_joint(instance, candidates, 0, candidates.len(), scope)
}

/// (e) Re-optimizes positions inside `order[lo..hi]`, holding the rest.
///
/// # Errors
/// Rejects an invalid window, unknown or repeated providers, a score vector
/// of the wrong length, and an order that does not fit the budget.
pub fn windowed_joint(
    instance: &Instance,
    order: &[ProviderId],
    lo: usize,
    hi: usize,
    scope: Scope<'_>,
) -> Result<Built<ScheduleDecoder>, FormulationError> {
    if lo > hi || hi > order.len() {
        return Err(FormulationError::InvalidWindow {
            lo,
            hi,
            len: order.len(),
        });
    }
    scope.check(instance)?;
    check_providers(instance, order)?;
    let required = total_cost(instance, order);
    if required > scope.time_budget {
        return Err(FormulationError::BudgetExceeded {
            required,
            budget: scope.time_budget,
        });
    }

    let name = if lo == 0 && hi == order.len() {
        "joint_order"
    } else {
        "windowed_joint"
    };
    let mut f = Formulation::new(name);
    let ships = add_item_assignment(&mut f, instance, order, scope.scores);

    // Cost of everything before the window; the window's total cost is
    // order-independent, so suffix capacities are constants too.
    let window_budget = scope.time_budget - total_cost(instance, &order[..lo]);
    let m = big_m(window_budget);
    let w = window_budget as f64;

    let positions = hi - lo;
    let window = &order[lo..hi];
    let remaining_at: Vec<VarId> = (0..positions)
        .map(|t| f.add_continuous(format!("remaining_pos_{t}"), 0.0, w))
        .collect();
    let place: Vec<Vec<VarId>> = window
        .iter()
        .map(|&p| {
            (0..positions)
                .map(|t| f.add_binary(format!("pos_{p}_{t}")))
                .collect()
        })
        .collect();
    let remaining_of: Vec<VarId> = window
        .iter()
        .map(|&p| f.add_continuous(format!("remaining_{p}"), 0.0, w))
        .collect();

    for xs in &place {
        f.add_constraint(
            ConstraintKind::OnePositionPerProvider,
            LinearExpr::sum_of(xs.iter().copied()),
            Sense::Eq,
            1.0,
        );
    }
    for t in 0..positions {
        f.add_constraint(
            ConstraintKind::OneProviderPerPosition,
            LinearExpr::sum_of(place.iter().map(|xs| xs[t])),
            Sense::Eq,
            1.0,
        );
    }
    for t in 0..positions {
        let mut chain = LinearExpr::from_var(remaining_at[t], 1.0);
        for (k, &p) in window.iter().enumerate() {
            chain.add_term(place[k][t], instance.provider(p).activation_cost as f64);
        }
        let rhs = if t == 0 {
            w
        } else {
            chain.add_term(remaining_at[t - 1], -1.0);
            0.0
        };
        f.add_constraint(ConstraintKind::RemainingTimeChain, chain, Sense::Eq, rhs);
    }
    for (k, xs) in place.iter().enumerate() {
        for (t, &x) in xs.iter().enumerate() {
            let mut link = LinearExpr::from_var(remaining_of[k], 1.0);
            link.add_term(remaining_at[t], -1.0);
            link.add_term(x, m);
            f.add_constraint(
                ConstraintKind::PositionRemainingTime { big_m: m },
                link,
                Sense::Le,
                m,
            );
        }
    }

    let mut segments = Vec::with_capacity(order.len() - positions + 1);
    let mut spent = 0u64;
    let mut window_candidates = Vec::with_capacity(positions);
    for (k, (&p, provider_ships)) in order.iter().zip(ships).enumerate() {
        let provider = instance.provider(p);
        spent += provider.activation_cost;
        let shipped = LinearExpr::sum_of(provider_ships.iter().map(|(_, v)| *v));

        if (lo..hi).contains(&k) {
            let slot = k - lo;
            let mut cap = shipped;
            cap.add_term(remaining_of[slot], -(provider.throughput_rate as f64));
            f.add_constraint(ConstraintKind::ShippingCapacity, cap, Sense::Le, 0.0);
            window_candidates.push(WindowCandidate {
                provider: p,
                position_vars: place[slot].clone(),
                ships: provider_ships,
            });
            if k + 1 == hi {
                segments.push(Segment::Window {
                    positions,
                    candidates: std::mem::take(&mut window_candidates),
                });
            }
        } else {
            if !shipped.is_empty() {
                let remaining = scope.time_budget - spent;
                f.add_constraint(
                    ConstraintKind::ShippingCapacity,
                    shipped,
                    Sense::Le,
                    provider.capacity(remaining) as f64,
                );
            }
            segments.push(Segment::Fixed {
                provider: p,
                ships: provider_ships,
            });
        }
    }

    tracing::debug!(
        model = name,
        lo,
        hi,
        window_budget,
        variables = f.num_variables(),
        binaries = f.num_binaries(),
        constraints = f.num_constraints(),
        "built joint formulation"
    );
    Ok(Built {
        formulation: f,
        decoder: ScheduleDecoder { segments },
    })
}
