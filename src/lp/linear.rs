//! Linear optimization problem value.
//!
//! A [`Formulation`] is plain data: typed variables, linear constraints and
//! one linear objective. It carries no solver handles and can be written to
//! LP text, handed to any [`Solver`](crate::solver::Solver), or evaluated
//! against a candidate assignment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const COEFF_EPS: f64 = 1e-12;

/// Index of a variable inside its [`Formulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VarId(usize);

impl VarId {
    /// Position of the variable in [`Formulation::variables`].
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VarDomain {
    /// Real value in `[lower, upper]`.
    Continuous { lower: f64, upper: f64 },
    /// 0 or 1.
    Binary,
}

impl VarDomain {
    /// Lower and upper bound.
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            VarDomain::Continuous { lower, upper } => (lower, upper),
            VarDomain::Binary => (0.0, 1.0),
        }
    }

    /// Whether the variable is integral.
    pub fn is_binary(&self) -> bool {
        matches!(self, VarDomain::Binary)
    }
}

/// A named decision variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    pub domain: VarDomain,
}

/// `sum(coeff * var) + constant`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearExpr {
    terms: BTreeMap<VarId, f64>,
    constant: f64,
}

impl LinearExpr {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_var(var: VarId, coeff: f64) -> Self {
        let mut e = Self::zero();
        e.add_term(var, coeff);
        e
    }

    /// Sum of the given variables with coefficient 1.
    pub fn sum_of(vars: impl IntoIterator<Item = VarId>) -> Self {
        let mut e = Self::zero();
        for v in vars {
            e.add_term(v, 1.0);
        }
        e
    }

    pub fn add_term(&mut self, var: VarId, coeff: f64) {
        let c = self.terms.entry(var).or_insert(0.0);
        *c += coeff;
        if c.abs() <= COEFF_EPS {
            self.terms.remove(&var);
        }
    }

    pub fn add_constant(&mut self, c: f64) {
        self.constant += c;
    }

    fn sub_inplace(&mut self, other: &LinearExpr) {
        self.constant -= other.constant;
        for (&v, &c) in &other.terms {
            self.add_term(v, -c);
        }
    }

    pub fn sub(mut self, other: LinearExpr) -> Self {
        self.sub_inplace(&other);
        self
    }

    /// Non-zero terms in variable order.
    pub fn terms(&self) -> impl Iterator<Item = (VarId, f64)> + '_ {
        self.terms.iter().map(|(&v, &c)| (v, c))
    }

    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value of the expression under `values` (indexed by [`VarId::index`]).
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(v, c)| c * values.get(v.index()).copied().unwrap_or(0.0))
                .sum::<f64>()
    }
}

/// Comparison operator of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

/// What a constraint encodes.
///
/// Tags let callers and tests locate constraint families without parsing
/// names, and carry the explicit constant of big-M rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// An item is shipped by at most one provider.
    ItemOnce,
    /// Coverage of an item never exceeds what actually supplies it.
    ItemUse,
    /// A provider ships no more than rate × remaining time.
    ShippingCapacity,
    /// Activated providers fit the time budget.
    ActivationBudget,
    /// Each window provider takes exactly one position.
    OnePositionPerProvider,
    /// Each window position holds exactly one provider.
    OneProviderPerPosition,
    /// Remaining time at a position follows from the previous position.
    RemainingTimeChain,
    /// A provider's remaining time is bounded by the remaining time at its
    /// position; inactive for other positions through `big_m`.
    PositionRemainingTime { big_m: f64 },
}

impl ConstraintKind {
    /// Short label used in generated constraint names.
    pub fn label(&self) -> &'static str {
        match self {
            ConstraintKind::ItemOnce => "item_once",
            ConstraintKind::ItemUse => "item_use",
            ConstraintKind::ShippingCapacity => "capacity",
            ConstraintKind::ActivationBudget => "budget",
            ConstraintKind::OnePositionPerProvider => "one_position",
            ConstraintKind::OneProviderPerPosition => "one_provider",
            ConstraintKind::RemainingTimeChain => "remaining_chain",
            ConstraintKind::PositionRemainingTime { .. } => "position_remaining",
        }
    }
}

/// `expr <sense> rhs`, with the constant already moved to `rhs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub expr: LinearExpr,
    pub sense: Sense,
    pub rhs: f64,
}

impl Constraint {
    /// Whether `values` satisfy the constraint within `tol`.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::Le => lhs <= self.rhs + tol,
            Sense::Ge => lhs >= self.rhs - tol,
            Sense::Eq => (lhs - self.rhs).abs() <= tol,
        }
    }
}

/// Objective direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjSense {
    Minimize,
    Maximize,
}

/// Linear objective with direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub sense: ObjSense,
    pub expr: LinearExpr,
}

/// A linear (mixed-binary) optimization problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formulation {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    objective: Objective,
}

impl Formulation {
    /// Creates an empty maximization problem.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: Objective {
                sense: ObjSense::Maximize,
                expr: LinearExpr::zero(),
            },
        }
    }

    pub fn add_variable(&mut self, name: impl Into<String>, domain: VarDomain) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(Variable {
            name: name.into(),
            domain,
        });
        id
    }

    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_variable(name, VarDomain::Binary)
    }

    pub fn add_continuous(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        self.add_variable(name, VarDomain::Continuous { lower, upper })
    }

    /// Adds `expr <sense> rhs`. Any constant in `expr` is folded into `rhs`.
    pub fn add_constraint(
        &mut self,
        kind: ConstraintKind,
        mut expr: LinearExpr,
        sense: Sense,
        rhs: f64,
    ) {
        let rhs = rhs - expr.constant;
        expr.constant = 0.0;
        let name = format!("{}_{}", kind.label(), self.constraints.len());
        self.constraints.push(Constraint {
            name,
            kind,
            expr,
            sense,
            rhs,
        });
    }

    pub fn set_objective(&mut self, sense: ObjSense, expr: LinearExpr) {
        self.objective = Objective { sense, expr };
    }

    pub fn maximize(&mut self, expr: LinearExpr) {
        self.set_objective(ObjSense::Maximize, expr);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.index()]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_binaries(&self) -> usize {
        self.variables.iter().filter(|v| v.domain.is_binary()).count()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value under `values`.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.expr.evaluate(values)
    }

    /// Names of constraints, bounds and integrality conditions violated by
    /// `values`. Empty when the assignment is feasible.
    pub fn violations(&self, values: &[f64], tol: f64) -> Vec<String> {
        let mut out = Vec::new();
        for (i, var) in self.variables.iter().enumerate() {
            let v = values.get(i).copied().unwrap_or(0.0);
            let (lo, hi) = var.domain.bounds();
            if v < lo - tol || v > hi + tol {
                out.push(format!("bound:{}", var.name));
            }
            if var.domain.is_binary() && (v - v.round()).abs() > tol {
                out.push(format!("integrality:{}", var.name));
            }
        }
        out.extend(
            self.constraints
                .iter()
                .filter(|c| !c.is_satisfied(values, tol))
                .map(|c| c.name.clone()),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_sub() {
        let mut f = Formulation::new("t");
        let x = f.add_binary("x");
        let y = f.add_binary("y");
        let c = LinearExpr::from_var(x, 1.0).sub(LinearExpr::from_var(y, 2.0));
        assert_eq!(c.coefficient(x), 1.0);
        assert_eq!(c.coefficient(y), -2.0);
    }

    #[test]
    fn test_cancelled_terms_removed() {
        let mut f = Formulation::new("t");
        let x = f.add_binary("x");
        let mut e = LinearExpr::from_var(x, 3.0);
        e.add_term(x, -3.0);
        assert!(e.is_empty());
    }

    #[test]
    fn test_constant_folded_into_rhs() {
        let mut f = Formulation::new("t");
        let x = f.add_continuous("x", 0.0, 10.0);
        let mut e = LinearExpr::from_var(x, 1.0);
        e.add_constant(4.0);
        f.add_constraint(ConstraintKind::ActivationBudget, e, Sense::Le, 6.0);
        let c = &f.constraints()[0];
        assert_eq!(c.rhs, 2.0);
        assert_eq!(c.expr.constant(), 0.0);
        assert_eq!(c.name, "budget_0");
    }

    #[test]
    fn test_evaluate_and_violations() {
        let mut f = Formulation::new("t");
        let x = f.add_binary("x");
        let y = f.add_continuous("y", 0.0, 1.0);
        f.add_constraint(
            ConstraintKind::ItemUse,
            LinearExpr::from_var(y, 1.0).sub(LinearExpr::from_var(x, 1.0)),
            Sense::Le,
            0.0,
        );
        f.maximize(LinearExpr::from_var(y, 7.0));

        assert!(f.violations(&[1.0, 1.0], 1e-9).is_empty());
        assert_eq!(f.objective_value(&[1.0, 1.0]), 7.0);

        let v = f.violations(&[0.0, 1.0], 1e-9);
        assert_eq!(v, vec!["item_use_0".to_string()]);

        let v = f.violations(&[0.5, 0.5], 1e-9);
        assert_eq!(v, vec!["integrality:x".to_string()]);
    }

    #[test]
    fn test_counts() {
        let mut f = Formulation::new("t");
        f.add_binary("a");
        f.add_binary("b");
        f.add_continuous("c", 0.0, 1.0);
        assert_eq!(f.num_variables(), 3);
        assert_eq!(f.num_binaries(), 2);
        assert_eq!(f.num_constraints(), 0);
        assert_eq!(f.objective().sense, ObjSense::Maximize);
    }
}
