//! Solver gateway errors.

use thiserror::Error;

/// Failure outcomes reported by a solver backend.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The backend proved that no feasible assignment exists.
    #[error("formulation is infeasible")]
    Infeasible,
    /// The backend reported an unbounded objective.
    #[error("formulation is unbounded")]
    Unbounded,
    /// The time limit expired before any feasible assignment was found.
    #[error("time limit reached without a feasible solution")]
    TimeLimitNoSolution,
    /// The backend executable could not be started.
    #[error("solver `{solver}` is unavailable: {source}")]
    Unavailable {
        solver: String,
        #[source]
        source: std::io::Error,
    },
    /// The backend reported a failure outside the categories above.
    #[error("solver failed: {0}")]
    Failed(String),
    /// The backend's output could not be interpreted.
    #[error("malformed solver output: {0}")]
    MalformedOutput(String),
    /// Scratch-file I/O failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<good_lp::ResolutionError> for SolverError {
    fn from(e: good_lp::ResolutionError) -> Self {
        match e {
            good_lp::ResolutionError::Infeasible => SolverError::Infeasible,
            good_lp::ResolutionError::Unbounded => SolverError::Unbounded,
            other => SolverError::Failed(other.to_string()),
        }
    }
}
