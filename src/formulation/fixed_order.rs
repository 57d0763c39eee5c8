//! (a) Item assignment for a fixed activation order.

use super::{
    add_item_assignment, check_providers, total_cost, Built, FormulationError, ScheduleDecoder,
    Scope, Segment,
};
use crate::lp::{ConstraintKind, Formulation, LinearExpr, Sense};
use crate::models::{Instance, ProviderId};

/// Builds the assignment problem for providers activated in `order`.
///
/// The provider at position k may ship up to
/// `throughput_rate × (budget − cost of order[..=k])` items.
///
/// # Errors
/// Rejects unknown or repeated providers, a score vector of the wrong
/// length, and an order whose activation costs exceed the scope budget.
pub fn fixed_order(
    instance: &Instance,
    order: &[ProviderId],
    scope: Scope<'_>,
) -> Result<Built<ScheduleDecoder>, FormulationError> {
    scope.check(instance)?;
    check_providers(instance, order)?;
    let required = total_cost(instance, order);
    if required > scope.time_budget {
        return Err(FormulationError::BudgetExceeded {
            required,
            budget: scope.time_budget,
        });
    }

    let mut f = Formulation::new("fixed_order");
    let ships = add_item_assignment(&mut f, instance, order, scope.scores);

    let mut remaining = scope.time_budget;
    let mut segments = Vec::with_capacity(order.len());
    for (&p, ships) in order.iter().zip(ships) {
        let provider = instance.provider(p);
        remaining -= provider.activation_cost;
        if !ships.is_empty() {
            f.add_constraint(
                ConstraintKind::ShippingCapacity,
                LinearExpr::sum_of(ships.iter().map(|(_, v)| *v)),
                Sense::Le,
                provider.capacity(remaining) as f64,
            );
        }
        segments.push(Segment::Fixed { provider: p, ships });
    }

    tracing::debug!(
        providers = order.len(),
        variables = f.num_variables(),
        constraints = f.num_constraints(),
        "built fixed-order formulation"
    );
    Ok(Built {
        formulation: f,
        decoder: ScheduleDecoder { segments },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulation::tests::small_instance;
    use crate::models::Provider;
    use crate::solver::{MicroLpSolver, Solver, SolverConfig};

    fn solve(built: &Built<ScheduleDecoder>) -> (f64, crate::models::Schedule) {
        let s = MicroLpSolver::new()
            .solve(&built.formulation, &SolverConfig::new())
            .unwrap();
        (s.objective, built.decoder.decode(&s))
    }

    #[test]
    fn test_single_provider_takes_both_items() {
        let inst = Instance::new(
            2,
            vec![10, 1],
            vec![Provider::new(0, 1, 5).with_catalog(vec![0, 1])],
        )
        .unwrap();
        let built = fixed_order(&inst, &[0], Scope::full(&inst)).unwrap();
        let (objective, schedule) = solve(&built);
        assert!((objective - 11.0).abs() < 1e-6);
        assert_eq!(schedule.entries.len(), 1);
        assert_eq!(schedule.entries[0].items, vec![0, 1]);
    }

    #[test]
    fn test_capacity_limits_shipments() {
        // remaining after activation is 1, rate 1: one item only
        let inst = Instance::new(
            2,
            vec![10, 1],
            vec![Provider::new(0, 1, 1).with_catalog(vec![0, 1])],
        )
        .unwrap();
        let built = fixed_order(&inst, &[0], Scope::full(&inst)).unwrap();
        let cap = built
            .formulation
            .constraints()
            .iter()
            .find(|c| c.kind == ConstraintKind::ShippingCapacity)
            .unwrap();
        assert_eq!(cap.rhs, 1.0);
        let (objective, schedule) = solve(&built);
        assert!((objective - 10.0).abs() < 1e-6);
        assert_eq!(schedule.entries[0].items, vec![0]);
    }

    #[test]
    fn test_full_coverage_when_capacity_suffices() {
        let inst = small_instance();
        let built = fixed_order(&inst, &[1, 0], Scope::full(&inst)).unwrap();
        let (objective, schedule) = solve(&built);
        // 5 + 3, item 2 scores nothing
        assert!((objective - 8.0).abs() < 1e-6);
        assert_eq!(schedule.provider_order(), vec![1, 0]);
        assert_eq!(schedule.distinct_items().len(), 2);
    }

    #[test]
    fn test_empty_entries_kept() {
        let inst = small_instance();
        let zeroed = [0u64, 3, 0];
        let built = fixed_order(&inst, &[0, 1], Scope::new(6, &zeroed)).unwrap();
        let (objective, schedule) = solve(&built);
        assert!((objective - 3.0).abs() < 1e-6);
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.assigned_count(), 1);
    }

    #[test]
    fn test_rejects_over_budget_order() {
        let inst = small_instance();
        let err = fixed_order(&inst, &[0, 1], Scope::new(2, inst.scores())).unwrap_err();
        assert_eq!(
            err,
            FormulationError::BudgetExceeded {
                required: 3,
                budget: 2
            }
        );
    }
}
