//! Solver selection and resource configuration.

use serde::{Deserialize, Serialize};

/// Which solving backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverChoice {
    /// In-process pure-Rust branch-and-bound (`good_lp` + `microlp`).
    #[default]
    MicroLp,
    /// External `scip` executable.
    Scip,
    /// External `cbc` executable.
    Cbc,
}

impl SolverChoice {
    /// Default resource configuration for this backend.
    ///
    /// CBC runs multi-threaded with an overall wall-clock cap; the other
    /// backends get no limits.
    pub fn default_config(self) -> SolverConfig {
        match self {
            SolverChoice::Cbc => SolverConfig::new().with_threads(4).with_time_limit_secs(300),
            SolverChoice::MicroLp | SolverChoice::Scip => SolverConfig::new(),
        }
    }
}

/// Opaque tuning knobs passed through to the backend.
///
/// Backends that do not support a knob ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Worker thread count.
    pub threads: Option<usize>,
    /// Wall-clock limit in seconds.
    pub time_limit_secs: Option<u64>,
}

impl SolverConfig {
    /// Creates a configuration with no limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the worker thread count.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Sets the wall-clock limit.
    pub fn with_time_limit_secs(mut self, secs: u64) -> Self {
        self.time_limit_secs = Some(secs);
        self
    }
}
