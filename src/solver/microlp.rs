//! In-process backend built on `good_lp` with the pure-Rust `microlp` engine.

use good_lp::solvers::microlp::microlp;
use good_lp::{
    constraint, variable, variables, Expression, Solution as _, SolverModel,
    Variable as LpVariable,
};

use super::{Solution, SolveStatus, Solver, SolverConfig, SolverError};
use crate::lp::{Formulation, LinearExpr, ObjSense, Sense, VarDomain};

/// Branch-and-bound over `microlp`.
///
/// Returns only proven-optimal solutions. Thread count and time limit are
/// not supported by the engine and are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

fn to_expression(expr: &LinearExpr, handles: &[LpVariable]) -> Expression {
    expr.terms().fold(Expression::from(expr.constant()), |acc, (v, c)| {
        acc + c * handles[v.index()]
    })
}

impl Solver for MicroLpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, f: &Formulation, config: &SolverConfig) -> Result<Solution, SolverError> {
        if config.threads.is_some() || config.time_limit_secs.is_some() {
            tracing::debug!("microlp ignores thread count and time limit");
        }

        let mut vars = variables!();
        let handles: Vec<LpVariable> = f
            .variables()
            .iter()
            .map(|v| {
                let def = match v.domain {
                    VarDomain::Binary => variable().binary(),
                    VarDomain::Continuous { lower, upper } => variable().min(lower).max(upper),
                };
                vars.add(def.name(v.name.clone()))
            })
            .collect();

        let objective = to_expression(&f.objective().expr, &handles);
        let unsolved = match f.objective().sense {
            ObjSense::Maximize => vars.maximise(objective),
            ObjSense::Minimize => vars.minimise(objective),
        };
        let mut model = unsolved.using(microlp);

        for c in f.constraints() {
            let lhs = to_expression(&c.expr, &handles);
            let rhs = c.rhs;
            let row = match c.sense {
                Sense::Le => constraint!(lhs <= rhs),
                Sense::Ge => constraint!(lhs >= rhs),
                Sense::Eq => constraint!(lhs == rhs),
            };
            model.add_constraint(row);
        }

        let solved = model.solve()?;
        let values = handles.iter().map(|&h| solved.value(h)).collect();
        Ok(Solution::from_values(f, SolveStatus::Optimal, values))
    }
}
