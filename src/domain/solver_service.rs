// Domain service interface for solving site selection programs
// Solvers sit behind a request/response boundary so engines can be swapped freely

use super::models::{RawOutcome, SolveRequest};
use super::value_objects::SolverClass;

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for optimization solvers
///
/// A backend receives the assembled program and returns the raw outcome.
/// Infeasible and unbounded programs are outcomes, not errors.
pub trait SolverService: Send + Sync {
    /// Solve the program described by `request`
    fn solve(&self, request: &SolveRequest) -> Result<RawOutcome>;

    /// Validate a request without solving it
    fn validate(&self, request: &SolveRequest) -> Result<()> {
        let mut errors = Vec::new();
        let num_vars = request.num_variables();

        if request.objective.num_variables() != num_vars {
            errors.push(format!(
                "Objective covers {} variables but request has {}",
                request.objective.num_variables(),
                num_vars
            ));
        }

        if request.constraint.num_variables() != num_vars {
            errors.push(format!(
                "Constraint '{}' has {} coefficients but request has {} variables",
                request.constraint.name,
                request.constraint.num_variables(),
                num_vars
            ));
        }

        if request.objective.solver_class() != request.solver_class {
            errors.push(format!(
                "{} objective cannot be sent to a {} solver",
                request.objective.kind(),
                request.solver_class
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidRequest(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;

    /// Class of program this backend can solve
    fn solver_class(&self) -> SolverClass;
}
