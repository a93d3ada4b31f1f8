// HiGHS Solver Adapter
// Implements the SolverService interface for HiGHS
// This is an adapter pattern - translates the site selection program to the HiGHS API

use crate::domain::{
    models::{RawOutcome, SolveRequest, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{SolverClass, TerminationCondition},
};
use highs::{HighsModelStatus, RowProblem, Sense};
use std::time::Instant;
use tracing::debug;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, request: &SolveRequest) -> Result<RawOutcome> {
        // Validate first
        self.validate(request)?;

        let coefficients = request.objective.linear_coefficients().ok_or_else(|| {
            SolverError::InvalidRequest(format!(
                "HiGHS only accepts linear objectives, got {}",
                request.objective.kind()
            ))
        })?;

        let start_time = Instant::now();

        // Add the open decisions first, then the budget row
        let mut pb = RowProblem::default();
        let cols: Vec<_> = coefficients
            .iter()
            .map(|&obj_coeff| pb.add_integer_column(obj_coeff, 0.0..=1.0))
            .collect();

        let constraint = &request.constraint;
        let terms: Vec<_> = cols
            .iter()
            .zip(&constraint.coefficients)
            .filter(|(_, &coeff)| coeff != 0.0)
            .map(|(&col, &coeff)| (col, coeff))
            .collect();
        pb.add_row(..=constraint.bound, &terms);

        let mut model = pb.optimise(Sense::Maximise);
        model.set_option("output_flag", request.config.verbose);
        if let Some(limit) = request.config.time_limit {
            model.set_option("time_limit", limit);
        }
        if let Some(gap) = request.config.gap_tolerance {
            model.set_option("mip_rel_gap", gap);
        }

        let solved = model.solve();
        let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;
        let statistics = SolverStatistics::for_request(request, solve_time);
        let status = solved.status();

        debug!(status = ?status, solve_time_ms = solve_time, "HiGHS finished");

        let outcome = match status {
            // An empty model is what HiGHS reports when there is nothing to decide
            HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => {
                let solution = solved.get_solution();
                RawOutcome::from_assignment(&request.objective, solution.columns().to_vec())
            }
            HighsModelStatus::Infeasible => RawOutcome::terminated(
                TerminationCondition::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            ),
            HighsModelStatus::Unbounded => RawOutcome::terminated(
                TerminationCondition::Unbounded,
                "Problem is unbounded: objective can be improved infinitely",
            ),
            HighsModelStatus::LoadError
            | HighsModelStatus::ModelError
            | HighsModelStatus::PresolveError
            | HighsModelStatus::SolveError
            | HighsModelStatus::PostsolveError => {
                return Err(SolverError::ExecutionFailed(format!(
                    "HiGHS solver returned status: {:?}",
                    status
                )))
            }
            other => RawOutcome::terminated(
                TerminationCondition::Other(format!("{:?}", other)),
                format!("HiGHS stopped without proving optimality: {:?}", other),
            ),
        };

        Ok(outcome.with_solver(self.name()).with_statistics(statistics))
    }

    fn name(&self) -> &str {
        "HiGHS"
    }

    fn solver_class(&self) -> SolverClass {
        SolverClass::MixedIntegerLinear
    }
}
