//! External command-line backends (`scip`, `cbc`).
//!
//! The formulation is written as LP text to a scratch file, the executable
//! is run to completion, and its solution file is parsed back into values
//! keyed by variable name.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::{Solution, SolveStatus, Solver, SolverConfig, SolverError};
use crate::lp::{write_lp, Formulation};

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Which executable dialect to speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverFlavor {
    Scip,
    Cbc,
}

impl SolverFlavor {
    fn name(self) -> &'static str {
        match self {
            SolverFlavor::Scip => "scip",
            SolverFlavor::Cbc => "cbc",
        }
    }

    fn env_var(self) -> &'static str {
        match self {
            SolverFlavor::Scip => "SCIP_BIN",
            SolverFlavor::Cbc => "CBC_BIN",
        }
    }
}

/// Runs an external MIP solver as a subprocess.
#[derive(Debug, Clone)]
pub struct CommandLineSolver {
    flavor: SolverFlavor,
    binary: PathBuf,
}

impl CommandLineSolver {
    /// Creates a backend; the executable is taken from `SCIP_BIN` / `CBC_BIN`
    /// when set, otherwise looked up on `PATH`.
    pub fn new(flavor: SolverFlavor) -> Self {
        let binary = std::env::var_os(flavor.env_var())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(flavor.name()));
        Self { flavor, binary }
    }

    pub fn scip() -> Self {
        Self::new(SolverFlavor::Scip)
    }

    pub fn cbc() -> Self {
        Self::new(SolverFlavor::Cbc)
    }

    /// Overrides the executable path.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn flavor(&self) -> SolverFlavor {
        self.flavor
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn run(&self, lp: &Path, sol: &Path, config: &SolverConfig) -> Result<(), SolverError> {
        let unavailable = |source| SolverError::Unavailable {
            solver: self.binary.display().to_string(),
            source,
        };

        let output = match self.flavor {
            SolverFlavor::Scip => {
                let script = scip_script(lp, sol, config);
                let mut child = Command::new(&self.binary)
                    .stdin(Stdio::piped())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped())
                    .spawn()
                    .map_err(unavailable)?;
                feed_and_wait(child, &script)?
            }
            SolverFlavor::Cbc => Command::new(&self.binary)
                .args(cbc_args(lp, sol, config))
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .output()
                .map_err(unavailable)?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SolverError::Failed(format!(
                "{} exited with {}: {}",
                self.flavor.name(),
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Writes `script` to the child's stdin and collects its output.
///
/// A child whose stdin cannot be written is killed and reaped before the
/// write error is returned.
fn feed_and_wait(mut child: Child, script: &str) -> std::io::Result<Output> {
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(script.as_bytes()) {
            drop(stdin);
            if let Err(kill) = child.kill() {
                tracing::debug!(error = %kill, "kill after failed stdin write");
            }
            child.wait()?;
            return Err(e);
        }
    }
    child.wait_with_output()
}

impl Solver for CommandLineSolver {
    fn name(&self) -> &str {
        self.flavor.name()
    }

    fn solve(&self, f: &Formulation, config: &SolverConfig) -> Result<Solution, SolverError> {
        let (lp_path, sol_path) = scratch_paths(self.flavor.name());
        fs::write(&lp_path, write_lp(f))?;
        tracing::debug!(lp = %lp_path.display(), binary = %self.binary.display(), "running solver");

        let result = self.run(&lp_path, &sol_path, config).and_then(|()| {
            let text = fs::read_to_string(&sol_path)?;
            let (status, named) = match self.flavor {
                SolverFlavor::Scip => parse_scip_solution(&text)?,
                SolverFlavor::Cbc => parse_cbc_solution(&text)?,
            };
            Ok(Solution::from_named(f, status, &named))
        });

        let _ = fs::remove_file(&lp_path);
        let _ = fs::remove_file(&sol_path);
        result
    }
}

fn scratch_paths(tag: &str) -> (PathBuf, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    let stem = format!("u_provision_{}_{}_{}_{}", tag, std::process::id(), nanos, seq);
    let dir = std::env::temp_dir();
    (dir.join(format!("{stem}.lp")), dir.join(format!("{stem}.sol")))
}

fn scip_script(lp: &Path, sol: &Path, config: &SolverConfig) -> String {
    let mut script = String::new();
    if let Some(secs) = config.time_limit_secs {
        script.push_str(&format!("set limits time {secs}\n"));
    }
    if let Some(threads) = config.threads {
        script.push_str(&format!("set parallel maxnthreads {threads}\n"));
    }
    script.push_str(&format!("read {}\n", lp.display()));
    script.push_str("set write printzeros TRUE\n");
    script.push_str("optimize\n");
    script.push_str(&format!("write solution {}\n", sol.display()));
    script.push_str("quit\n");
    script
}

fn cbc_args(lp: &Path, sol: &Path, config: &SolverConfig) -> Vec<String> {
    let mut args = vec![lp.display().to_string()];
    if let Some(threads) = config.threads {
        args.push("threads".into());
        args.push(threads.to_string());
    }
    if let Some(secs) = config.time_limit_secs {
        args.push("sec".into());
        args.push(secs.to_string());
    }
    args.push("solve".into());
    args.push("solu".into());
    args.push(sol.display().to_string());
    args
}

/// Parses a SCIP `write solution` file.
///
/// ```text
/// solution status: optimal solution found
/// objective value:                   11
/// ship_0_0                            1   (obj:0)
/// ```
pub(crate) fn parse_scip_solution(
    text: &str,
) -> Result<(SolveStatus, HashMap<String, f64>), SolverError> {
    let mut status_line = None;
    let mut values = HashMap::new();
    let mut has_solution = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let lower = trimmed.to_ascii_lowercase();
        if let Some(rest) = lower.strip_prefix("solution status:") {
            status_line = Some(rest.trim().to_string());
            continue;
        }
        if lower.starts_with("no solution available") {
            has_solution = false;
            continue;
        }
        if lower.starts_with("objective value:") {
            has_solution = true;
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let (Some(name), Some(raw)) = (parts.next(), parts.next()) else {
            continue;
        };
        let value = raw.parse::<f64>().map_err(|_| {
            SolverError::MalformedOutput(format!("bad value `{raw}` for `{name}`"))
        })?;
        values.insert(name.to_string(), value);
        has_solution = true;
    }

    let status = status_line
        .ok_or_else(|| SolverError::MalformedOutput("missing solution status".into()))?;

    if !has_solution {
        return Err(if status.contains("infeasible") {
            SolverError::Infeasible
        } else if status.contains("unbounded") {
            SolverError::Unbounded
        } else if status.contains("limit") {
            SolverError::TimeLimitNoSolution
        } else {
            SolverError::Failed(format!("scip: {status}"))
        });
    }

    let quality = if status.contains("optimal") {
        SolveStatus::Optimal
    } else {
        SolveStatus::Feasible
    };
    Ok((quality, values))
}

/// Parses a CBC `solu` file.
///
/// ```text
/// Optimal - objective value 11.00000000
///       0 cover_0                1                      -10
///       1 ship_0_0               1                        0
/// ```
pub(crate) fn parse_cbc_solution(
    text: &str,
) -> Result<(SolveStatus, HashMap<String, f64>), SolverError> {
    let mut lines = text.lines();
    let header = lines
        .next()
        .map(|l| l.trim().to_ascii_lowercase())
        .ok_or_else(|| SolverError::MalformedOutput("empty solution file".into()))?;

    let status = if header.starts_with("optimal") {
        SolveStatus::Optimal
    } else if header.contains("infeasible") {
        return Err(SolverError::Infeasible);
    } else if header.contains("unbounded") {
        return Err(SolverError::Unbounded);
    } else if header.contains("no integer solution") {
        return Err(SolverError::TimeLimitNoSolution);
    } else if header.starts_with("stopped") {
        SolveStatus::Feasible
    } else {
        return Err(SolverError::Failed(format!("cbc: {header}")));
    };

    let mut values = HashMap::new();
    for line in lines {
        let fields: Vec<&str> = line
            .split_whitespace()
            .filter(|t| *t != "**")
            .collect();
        if fields.len() < 3 {
            continue;
        }
        let value = fields[2].parse::<f64>().map_err(|_| {
            SolverError::MalformedOutput(format!("bad value `{}` for `{}`", fields[2], fields[1]))
        })?;
        values.insert(fields[1].to_string(), value);
    }
    Ok((status, values))
}
