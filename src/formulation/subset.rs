//! (b)/(c) Provider subset selection.
//!
//! Both variants ignore shipping throughput: an activated provider is
//! assumed to deliver its whole catalog. They answer "which providers are
//! worth activating under this budget" and feed a later (a) or (d) run.

use super::{check_providers, Built, FormulationError, Scope, SubsetDecoder};
use crate::lp::{ConstraintKind, Formulation, LinearExpr, Sense, VarId};
use crate::models::{Instance, ItemId, ProviderId};
use std::collections::BTreeMap;

/// (b) Subset selection against the instance's own scores.
pub fn unlimited_shipping_subset(
    instance: &Instance,
    candidates: &[ProviderId],
    time_budget: u64,
) -> Result<Built<SubsetDecoder>, FormulationError> {
    build(
        "unlimited_shipping_subset",
        instance,
        candidates,
        Scope::new(time_budget, instance.scores()),
    )
}

/// (c) Subset selection against caller-supplied remaining scores, e.g.
/// with items already delivered by a fixed prefix zeroed out.
pub fn remaining_score_subset(
    instance: &Instance,
    candidates: &[ProviderId],
    scores: &[u64],
    time_budget: u64,
) -> Result<Built<SubsetDecoder>, FormulationError> {
    build(
        "remaining_score_subset",
        instance,
        candidates,
        Scope::new(time_budget, scores),
    )
}

fn build(
    name: &str,
    instance: &Instance,
    candidates: &[ProviderId],
    scope: Scope<'_>,
) -> Result<Built<SubsetDecoder>, FormulationError> {
    scope.check(instance)?;
    check_providers(instance, candidates)?;

    let mut f = Formulation::new(name);
    let activations: Vec<(ProviderId, VarId)> = candidates
        .iter()
        .map(|&p| (p, f.add_binary(format!("activate_{p}"))))
        .collect();

    let mut carriers: BTreeMap<ItemId, Vec<VarId>> = BTreeMap::new();
    for &(p, x) in &activations {
        for &i in &instance.provider(p).catalog {
            if scope.scores[i] > 0 {
                carriers.entry(i).or_default().push(x);
            }
        }
    }

    let mut objective = LinearExpr::zero();
    for (i, xs) in carriers {
        let cover = f.add_continuous(format!("cover_{i}"), 0.0, 1.0);
        f.add_constraint(
            ConstraintKind::ItemUse,
            LinearExpr::from_var(cover, 1.0).sub(LinearExpr::sum_of(xs)),
            Sense::Le,
            0.0,
        );
        objective.add_term(cover, scope.scores[i] as f64);
    }

    let mut budget = LinearExpr::zero();
    for &(p, x) in &activations {
        budget.add_term(x, instance.provider(p).activation_cost as f64);
    }
    f.add_constraint(
        ConstraintKind::ActivationBudget,
        budget,
        Sense::Le,
        scope.time_budget as f64,
    );
    f.maximize(objective);

    tracing::debug!(
        model = name,
        candidates = candidates.len(),
        variables = f.num_variables(),
        "built subset formulation"
    );
    Ok(Built {
        formulation: f,
        decoder: SubsetDecoder { activations },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;
    use crate::solver::{MicroLpSolver, Solver, SolverConfig};

    fn instance() -> Instance {
        // provider 0 is expensive but carries the best item
        Instance::new(
            4,
            vec![9, 4, 4],
            vec![
                Provider::new(0, 3, 1).with_catalog(vec![0]),
                Provider::new(1, 2, 1).with_catalog(vec![1]),
                Provider::new(2, 2, 1).with_catalog(vec![2]),
            ],
        )
        .unwrap()
    }

    fn solve(built: &Built<SubsetDecoder>) -> (f64, Vec<ProviderId>) {
        let s = MicroLpSolver::new()
            .solve(&built.formulation, &SolverConfig::new())
            .unwrap();
        (s.objective, built.decoder.decode(&s))
    }

    #[test]
    fn test_budget_row() {
        let inst = instance();
        let built = unlimited_shipping_subset(&inst, &[0, 1, 2], 4).unwrap();
        let budget = built
            .formulation
            .constraints()
            .iter()
            .find(|c| c.kind == ConstraintKind::ActivationBudget)
            .unwrap();
        assert_eq!(budget.rhs, 4.0);
        assert_eq!(budget.expr.terms().count(), 3);
        assert!(!built
            .formulation
            .constraints()
            .iter()
            .any(|c| c.kind == ConstraintKind::ShippingCapacity));
    }

    #[test]
    fn test_unlimited_prefers_pair() {
        let inst = instance();
        let built = unlimited_shipping_subset(&inst, &[0, 1, 2], 4).unwrap();
        let (objective, chosen) = solve(&built);
        // 9 alone beats 4 + 4
        assert!((objective - 9.0).abs() < 1e-6);
        assert_eq!(chosen, vec![0]);
    }

    #[test]
    fn test_remaining_scores_change_choice() {
        let inst = instance();
        let remaining = [0u64, 4, 4];
        let built = remaining_score_subset(&inst, &[0, 1, 2], &remaining, 4).unwrap();
        let (objective, chosen) = solve(&built);
        assert!((objective - 8.0).abs() < 1e-6);
        assert_eq!(chosen, vec![1, 2]);
    }

    #[test]
    fn test_rejects_bad_scores() {
        let inst = instance();
        assert!(matches!(
            remaining_score_subset(&inst, &[0], &[1], 4),
            Err(FormulationError::ScoreLengthMismatch { .. })
        ));
    }
}
