// GLPK Solver Adapter
// Runs the `glpsol` executable as an external process: the program goes out as a
// CPLEX LP file and comes back as a GLPK raw solution file

use crate::domain::{
    models::{RawOutcome, SolveRequest, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{SolverClass, TerminationCondition},
};
use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::{debug, info};

/// Name of the GLPK stand-alone solver binary
pub const GLPSOL_BINARY: &str = "glpsol";

pub struct GlpkSolver {
    binary: Option<PathBuf>,
}

impl GlpkSolver {
    /// Use `glpsol` from the request configuration or from `PATH`
    pub fn new() -> Self {
        Self { binary: None }
    }

    /// Always run the given executable
    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            binary: Some(path.into()),
        }
    }

    /// Find the executable: explicit path first, then the configured one, then `PATH`
    pub fn locate(&self, request: &SolveRequest) -> Result<PathBuf> {
        let explicit = self
            .binary
            .as_ref()
            .or(request.config.glpsol_path.as_ref());

        match explicit {
            Some(path) if path.is_file() => Ok(path.clone()),
            Some(path) => Err(SolverError::SolverNotAvailable(format!(
                "glpsol executable not found at {}",
                path.display()
            ))),
            None => which::which(GLPSOL_BINARY).map_err(|e| {
                SolverError::SolverNotAvailable(format!(
                    "{} is not on PATH ({}); install GLPK or set glpsol_path",
                    GLPSOL_BINARY, e
                ))
            }),
        }
    }

    fn run(&self, binary: &Path, request: &SolveRequest, lp_text: &str) -> Result<String> {
        let workdir = tempfile::tempdir()
            .map_err(|e| SolverError::ExecutionFailed(format!("cannot create work dir: {}", e)))?;
        let lp_path = workdir.path().join("model.lp");
        let solution_path = workdir.path().join("solution.txt");

        std::fs::write(&lp_path, lp_text)
            .map_err(|e| SolverError::ExecutionFailed(format!("cannot write LP file: {}", e)))?;

        let mut command = Command::new(binary);
        command
            .arg("--lp")
            .arg(&lp_path)
            .arg("-w")
            .arg(&solution_path);
        if let Some(limit) = request.config.time_limit {
            command.arg("--tmlim").arg(limit.ceil().max(1.0).to_string());
        }
        if let Some(gap) = request.config.gap_tolerance {
            command.arg("--mipgap").arg(gap.to_string());
        }

        debug!(binary = %binary.display(), "starting glpsol");
        let output = command.output().map_err(|e| match e.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                SolverError::SolverNotAvailable(format!(
                    "cannot start {}: {}",
                    binary.display(),
                    e
                ))
            }
            _ => SolverError::ExecutionFailed(format!("cannot start {}: {}", binary.display(), e)),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        for line in stdout.lines() {
            if request.config.verbose {
                info!(target: "glpsol", "{}", line);
            } else {
                debug!(target: "glpsol", "{}", line);
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SolverError::ExecutionFailed(format!(
                "glpsol exited with {}: {}",
                output.status,
                last_lines(&stderr, &stdout)
            )));
        }

        std::fs::read_to_string(&solution_path).map_err(|e| {
            SolverError::ExecutionFailed(format!("glpsol wrote no solution file: {}", e))
        })
    }
}

impl Default for GlpkSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for GlpkSolver {
    fn solve(&self, request: &SolveRequest) -> Result<RawOutcome> {
        self.validate(request)?;

        let coefficients = request.objective.linear_coefficients().ok_or_else(|| {
            SolverError::InvalidRequest(format!(
                "GLPK only accepts linear objectives, got {}",
                request.objective.kind()
            ))
        })?;

        let start_time = Instant::now();

        // glpsol refuses programs without columns; nothing to decide is trivially optimal
        if request.num_variables() == 0 {
            let value = request.objective.evaluate(&[]);
            return Ok(RawOutcome::optimal(value, Vec::new())
                .with_solver(self.name())
                .with_statistics(SolverStatistics::for_request(request, 0.0)));
        }

        let binary = self.locate(request)?;
        let lp_text = write_cplex_lp(request, coefficients);
        let raw_solution = self.run(&binary, request, &lp_text)?;
        let parsed = parse_raw_solution(&raw_solution, request.num_variables())?;

        let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;
        let statistics = SolverStatistics::for_request(request, solve_time);

        let outcome = match parsed.termination {
            TerminationCondition::Optimal => {
                RawOutcome::from_assignment(&request.objective, parsed.values)
            }
            TerminationCondition::Infeasible => RawOutcome::terminated(
                TerminationCondition::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            ),
            other => {
                let message = format!("glpsol stopped with solution status '{}'", other);
                RawOutcome::terminated(other, message)
            }
        };

        Ok(outcome.with_solver(self.name()).with_statistics(statistics))
    }

    fn name(&self) -> &str {
        "GLPK"
    }

    fn solver_class(&self) -> SolverClass {
        SolverClass::MixedIntegerLinear
    }
}

/// Render the program in CPLEX LP format.
///
/// Columns are named `x_<index>` and every column appears in the objective, in
/// order, so glpsol numbers them the same way the request does.
pub fn write_cplex_lp(request: &SolveRequest, coefficients: &[f64]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\\* {} *\\", request.name);
    let _ = writeln!(out, "Maximize");
    let _ = writeln!(out, " obj:{}", linear_terms(coefficients, true));

    let constraint = &request.constraint;
    let row_name = if constraint.name.is_empty() {
        "c1"
    } else {
        constraint.name.as_str()
    };
    let _ = writeln!(out, "Subject To");
    let _ = writeln!(
        out,
        " {}:{} <= {}",
        row_name,
        linear_terms(&constraint.coefficients, false),
        constraint.bound
    );

    if !request.variables.is_empty() {
        let _ = writeln!(out, "Binary");
        for j in 0..request.variables.len() {
            let _ = writeln!(out, " x_{}", j);
        }
    }

    let _ = writeln!(out, "End");
    out
}

fn linear_terms(coefficients: &[f64], keep_zeros: bool) -> String {
    let mut terms = String::new();
    for (j, &coeff) in coefficients.iter().enumerate() {
        if coeff == 0.0 && !keep_zeros {
            continue;
        }
        let sign = if coeff < 0.0 { '-' } else { '+' };
        let _ = write!(terms, " {} {} x_{}", sign, coeff.abs(), j);
    }
    terms
}

/// Termination and column values read back from glpsol
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSolution {
    pub termination: TerminationCondition,
    pub values: Vec<f64>,
}

/// Parse a solution written by `glpsol -w`.
///
/// Understands the `s mip` and `s bas` solution lines; column values come from
/// `j <col> <value>` lines (MIP) or `j <col> <stat> <value> <dual>` lines (basic).
pub fn parse_raw_solution(text: &str, num_columns: usize) -> Result<ParsedSolution> {
    let mut termination = None;
    let mut kind = "";
    let mut values = vec![0.0; num_columns];

    for line in text.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            ["s", "mip", _rows, cols, status, ..] => {
                check_columns(cols, num_columns)?;
                kind = "mip";
                termination = Some(match *status {
                    "o" => TerminationCondition::Optimal,
                    "n" => TerminationCondition::Infeasible,
                    "f" => TerminationCondition::Other("integer feasible".to_string()),
                    _ => TerminationCondition::Other("undefined".to_string()),
                });
            }
            ["s", "bas", _rows, cols, primal, dual, ..] => {
                check_columns(cols, num_columns)?;
                kind = "bas";
                termination = Some(match (*primal, *dual) {
                    ("f", "f") => TerminationCondition::Optimal,
                    ("n", _) | ("i", _) => TerminationCondition::Infeasible,
                    ("f", "n") => TerminationCondition::Unbounded,
                    (p, d) => TerminationCondition::Other(format!("primal {} dual {}", p, d)),
                });
            }
            ["j", col, rest @ ..] => {
                let value = match (kind, rest) {
                    ("mip", [value, ..]) => value,
                    ("bas", [_stat, value, ..]) => value,
                    _ => return Err(malformed(line)),
                };
                let col: usize = col.parse().map_err(|_| malformed(line))?;
                if col == 0 || col > num_columns {
                    return Err(malformed(line));
                }
                values[col - 1] = value.parse().map_err(|_| malformed(line))?;
            }
            _ => {}
        }
    }

    let termination = termination.ok_or_else(|| {
        SolverError::ExecutionFailed("glpsol solution file has no status line".to_string())
    })?;

    Ok(ParsedSolution {
        termination,
        values,
    })
}

fn check_columns(field: &str, expected: usize) -> Result<()> {
    match field.parse::<usize>() {
        Ok(n) if n == expected => Ok(()),
        _ => Err(SolverError::ExecutionFailed(format!(
            "glpsol reported {} columns, expected {}",
            field, expected
        ))),
    }
}

fn malformed(line: &str) -> SolverError {
    SolverError::ExecutionFailed(format!("unreadable glpsol solution line: '{}'", line))
}

fn last_lines(stderr: &str, stdout: &str) -> String {
    let source = if stderr.trim().is_empty() { stdout } else { stderr };
    let lines: Vec<&str> = source.lines().collect();
    lines[lines.len().saturating_sub(5)..].join(" | ")
}
