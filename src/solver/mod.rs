//! Solver gateway.
//!
//! A narrow boundary between formulations and whatever engine solves them.
//! The gateway performs no semantic validation: it forwards a
//! [`Formulation`] and a [`SolverConfig`] to a backend and returns either a
//! value per variable or a [`SolverError`]. Decoding the values is the job
//! of the decoder paired with the formulation.
//!
//! # Backends
//!
//! - [`MicroLpSolver`]: in-process, pure Rust, ignores threads and time limit.
//! - [`CommandLineSolver`]: writes LP text to a scratch file and runs `scip`
//!   or `cbc`, then parses the solution file.
//!
//! Every call is blocking and self-contained. Independent formulations can
//! be solved from several threads at once without coordination.

mod command;
mod config;
mod error;
mod microlp;

pub use command::{CommandLineSolver, SolverFlavor};
pub use config::{SolverChoice, SolverConfig};
pub use error::SolverError;
pub use microlp::MicroLpSolver;

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::lp::{Formulation, VarId};

/// Values strictly above this are read as 1 for binary-domain variables.
///
/// Floating-point engines return values such as `0.999999`; every decoder
/// applies this single rule instead of comparing against exact 0 or 1.
pub const BINARY_THRESHOLD: f64 = 0.5;

/// Quality of a returned assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Proven optimal.
    Optimal,
    /// Best assignment found before a limit was reached.
    Feasible,
}

/// A value for every variable of the solved formulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// Optimality status.
    pub status: SolveStatus,
    /// Objective value of `values` under the submitted formulation.
    pub objective: f64,
    values: Vec<f64>,
}

impl Solution {
    /// Builds a solution from values indexed by [`VarId::index`].
    pub fn from_values(formulation: &Formulation, status: SolveStatus, values: Vec<f64>) -> Self {
        let objective = formulation.objective_value(&values);
        Self {
            status,
            objective,
            values,
        }
    }

    /// Builds a solution from values keyed by variable name.
    ///
    /// Variables the backend did not report are read as 0.
    pub fn from_named(
        formulation: &Formulation,
        status: SolveStatus,
        named: &HashMap<String, f64>,
    ) -> Self {
        let values = formulation
            .variables()
            .iter()
            .map(|v| named.get(&v.name).copied().unwrap_or(0.0))
            .collect();
        Self::from_values(formulation, status, values)
    }

    /// Raw value of a variable.
    pub fn value(&self, var: VarId) -> f64 {
        self.values.get(var.index()).copied().unwrap_or(0.0)
    }

    /// Whether a binary variable is set, per [`BINARY_THRESHOLD`].
    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var) > BINARY_THRESHOLD
    }

    /// All values, indexed by [`VarId::index`].
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Whether the assignment is proven optimal.
    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }
}

/// A solving backend.
pub trait Solver: Send + Sync {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Solves `formulation` under `config`.
    fn solve(&self, formulation: &Formulation, config: &SolverConfig)
        -> Result<Solution, SolverError>;
}

/// A backend plus the configuration to run it with.
///
/// # Example
/// ```
/// use u_provision::lp::{Formulation, LinearExpr};
/// use u_provision::solver::{SolverChoice, SolverGateway};
///
/// let mut f = Formulation::new("one");
/// let x = f.add_binary("x");
/// f.maximize(LinearExpr::from_var(x, 3.0));
///
/// let gateway = SolverGateway::from_choice(SolverChoice::MicroLp);
/// let solution = gateway.solve(&f).unwrap();
/// assert!(solution.is_set(x));
/// assert!((solution.objective - 3.0).abs() < 1e-6);
/// ```
pub struct SolverGateway {
    solver: Box<dyn Solver>,
    config: SolverConfig,
}

impl SolverGateway {
    /// Wraps an arbitrary backend with an empty configuration.
    pub fn new<S: Solver + 'static>(solver: S) -> Self {
        Self {
            solver: Box::new(solver),
            config: SolverConfig::new(),
        }
    }

    /// Creates a gateway for a built-in backend with its default configuration.
    pub fn from_choice(choice: SolverChoice) -> Self {
        let solver: Box<dyn Solver> = match choice {
            SolverChoice::MicroLp => Box::new(MicroLpSolver::new()),
            SolverChoice::Scip => Box::new(CommandLineSolver::scip()),
            SolverChoice::Cbc => Box::new(CommandLineSolver::cbc()),
        };
        Self {
            solver,
            config: choice.default_config(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Backend name.
    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    /// Forwards `formulation` to the backend.
    pub fn solve(&self, formulation: &Formulation) -> Result<Solution, SolverError> {
        let started = Instant::now();
        tracing::debug!(
            solver = self.solver.name(),
            model = formulation.name(),
            variables = formulation.num_variables(),
            binaries = formulation.num_binaries(),
            constraints = formulation.num_constraints(),
            "submitting formulation"
        );
        let result = self.solver.solve(formulation, &self.config);
        match &result {
            Ok(solution) => tracing::info!(
                solver = self.solver.name(),
                model = formulation.name(),
                status = ?solution.status,
                objective = solution.objective,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "solve finished"
            ),
            Err(e) => tracing::info!(
                solver = self.solver.name(),
                model = formulation.name(),
                error = %e,
                "solve failed"
            ),
        }
        result
    }
}

impl std::fmt::Debug for SolverGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverGateway")
            .field("solver", &self.solver.name())
            .field("config", &self.config)
            .finish()
    }
}
