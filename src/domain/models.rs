use std::path::PathBuf;

use serde::Deserialize;

use super::objective::ObjectiveStrategy;
use super::value_objects::{OutcomeStatus, SolverBackend, SolverClass, TerminationCondition};

/// A candidate counts as opened when the solver's value for its decision
/// exceeds this threshold. Solvers return binaries as floating-point numbers
/// that may sit slightly off 0 or 1, so the comparison is never against 1.
pub const OPEN_THRESHOLD: f64 = 0.5;

/// Binary open decision for one candidate site
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
}

impl Variable {
    pub fn binary(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Packing row Σ_j a_j x[j] ≤ bound
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub coefficients: Vec<f64>,
    pub bound: f64,
    pub name: String,
}

impl Constraint {
    pub fn new(coefficients: Vec<f64>, bound: f64) -> Self {
        Self {
            coefficients,
            bound,
            name: String::new(),
        }
    }

    /// Σ_j x[j] ≤ budget over `num_candidates` open decisions
    pub fn budget(num_candidates: usize, budget: usize) -> Self {
        Self::new(vec![1.0; num_candidates], budget as f64).with_name("budget")
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn num_variables(&self) -> usize {
        self.coefficients.len()
    }
}

/// Configuration for the solver
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Seconds before the backend gives up
    pub time_limit: Option<f64>,
    /// Relative optimality gap accepted as optimal
    pub gap_tolerance: Option<f64>,
    /// Let the backend print its own progress log
    pub verbose: bool,
    /// Node budget for branch-and-bound backends
    pub max_nodes: Option<u64>,
    /// Explicit path to the `glpsol` executable
    pub glpsol_path: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            time_limit: None,
            gap_tolerance: None,
            verbose: false,
            max_nodes: None,
            glpsol_path: None,
        }
    }
}

/// Everything a solver backend receives: the assembled program and how to solve it
#[derive(Debug, Clone)]
pub struct SolveRequest {
    pub name: String,
    pub variables: Vec<Variable>,
    pub objective: ObjectiveStrategy,
    pub constraint: Constraint,
    pub solver_class: SolverClass,
    pub config: SolverConfig,
}

impl SolveRequest {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub nodes_explored: u64,
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
    pub num_binary_vars: u32,
}

impl SolverStatistics {
    pub fn for_request(request: &SolveRequest, solve_time_ms: f64) -> Self {
        Self {
            nodes_explored: 0,
            solve_time_ms,
            num_variables: request.num_variables() as u32,
            num_constraints: 1,
            num_binary_vars: request.num_variables() as u32,
        }
    }
}

/// Raw solver response, passed through without interpretation
#[derive(Debug, Clone)]
pub struct RawOutcome {
    pub status: OutcomeStatus,
    pub termination: TerminationCondition,
    pub objective_value: Option<f64>,
    pub variable_values: Vec<f64>,
    pub message: String,
    pub solver: String,
    pub statistics: SolverStatistics,
}

impl RawOutcome {
    /// The solver ran and stopped for a reason other than proving optimality
    pub fn terminated(termination: TerminationCondition, message: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Ok,
            termination,
            objective_value: None,
            variable_values: Vec::new(),
            message: message.into(),
            solver: String::new(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn optimal(value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            objective_value: Some(value),
            variable_values,
            ..Self::terminated(TerminationCondition::Optimal, "Optimal solution found")
        }
    }

    /// Optimal outcome for engine values that may carry integrality slack.
    ///
    /// The raw values are kept as reported; the objective is scored on the
    /// rounded 0/1 assignment the report will read back.
    pub fn from_assignment(objective: &ObjectiveStrategy, variable_values: Vec<f64>) -> Self {
        let rounded: Vec<f64> = variable_values
            .iter()
            .map(|&x| if x > OPEN_THRESHOLD { 1.0 } else { 0.0 })
            .collect();
        Self::optimal(objective.evaluate(&rounded), variable_values)
    }

    pub fn unavailable(solver: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::SolverUnavailable,
            solver: solver.into(),
            ..Self::terminated(TerminationCondition::Other("not started".into()), detail)
        }
    }

    pub fn failed(solver: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::SolverError,
            solver: solver.into(),
            ..Self::terminated(TerminationCondition::Other("aborted".into()), detail)
        }
    }

    pub fn with_solver(mut self, solver: impl Into<String>) -> Self {
        self.solver = solver.into();
        self
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == OutcomeStatus::Ok && self.termination == TerminationCondition::Optimal
    }
}
