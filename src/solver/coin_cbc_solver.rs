use crate::domain::{
    models::{RawOutcome, SolveRequest, SolverStatistics},
    objective::ObjectiveStrategy,
    solver_service::{Result, SolverError, SolverService},
    value_objects::{SolverClass, TerminationCondition},
};
use good_lp::{
    solvers::coin_cbc, variable, variables, Expression, ResolutionError,
    Solution as GoodLpSolutionTrait, SolutionStatus, SolverModel, Variable as GoodLpVariable,
};
use std::time::Instant;
use tracing::debug;

/// Read a returned CBC solution by the reason CBC stopped.
///
/// CBC hands back its incumbent when the time limit hits; only a proven
/// optimum or one within the requested `ratioGap` counts as optimal, the same
/// acceptance HiGHS applies with `mip_rel_gap`.
fn solved_outcome(
    status: SolutionStatus,
    objective: &ObjectiveStrategy,
    variable_values: Vec<f64>,
) -> RawOutcome {
    match status {
        SolutionStatus::Optimal | SolutionStatus::GapLimit => {
            RawOutcome::from_assignment(objective, variable_values)
        }
        SolutionStatus::TimeLimit => RawOutcome::terminated(
            TerminationCondition::Other("TimeLimit".to_string()),
            "CBC stopped at the time limit without proving optimality",
        ),
    }
}

pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for CoinCbcSolver {
    fn solve(&self, request: &SolveRequest) -> Result<RawOutcome> {
        // Validate first
        self.validate(request)?;

        let coefficients = request.objective.linear_coefficients().ok_or_else(|| {
            SolverError::InvalidRequest(format!(
                "CBC only accepts linear objectives, got {}",
                request.objective.kind()
            ))
        })?;

        let start_time = Instant::now();

        // Build the open decisions using good_lp
        let mut vars = variables!();
        let lp_variables: Vec<GoodLpVariable> = request
            .variables
            .iter()
            .map(|_| vars.add(variable().binary()))
            .collect();

        // Build objective expression
        let mut obj_expr: Expression = 0.into();
        for (&coeff, &var) in coefficients.iter().zip(&lp_variables) {
            if coeff != 0.0 {
                obj_expr += coeff * var;
            }
        }

        let mut lp_model = vars.maximise(obj_expr).using(coin_cbc::coin_cbc);

        if !request.config.verbose {
            lp_model.set_parameter("log", "0");
        }
        if let Some(limit) = request.config.time_limit {
            lp_model.set_parameter("sec", &limit.to_string());
        }
        if let Some(gap) = request.config.gap_tolerance {
            lp_model.set_parameter("ratioGap", &gap.to_string());
        }

        // Build the budget constraint
        let constraint = &request.constraint;
        let mut lhs: Expression = 0.into();
        for (&coeff, &var) in constraint.coefficients.iter().zip(&lp_variables) {
            if coeff != 0.0 {
                lhs += coeff * var;
            }
        }

        lp_model = lp_model.with(lhs.leq(constraint.bound));

        // Solve the problem
        let solution_result = lp_model.solve();
        let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;
        let statistics = SolverStatistics::for_request(request, solve_time);

        debug!(solve_time_ms = solve_time, ok = solution_result.is_ok(), "CBC finished");

        let outcome = match solution_result {
            Ok(sol) => {
                let variable_values = lp_variables.iter().map(|&var| sol.value(var)).collect();
                solved_outcome(sol.status(), &request.objective, variable_values)
            }
            Err(ResolutionError::Infeasible) => RawOutcome::terminated(
                TerminationCondition::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            ),
            Err(ResolutionError::Unbounded) => RawOutcome::terminated(
                TerminationCondition::Unbounded,
                "Problem is unbounded: objective can be improved infinitely",
            ),
            Err(e) => return Err(SolverError::ExecutionFailed(format!("{:?}", e))),
        };

        Ok(outcome.with_solver(self.name()).with_statistics(statistics))
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }

    fn solver_class(&self) -> SolverClass {
        SolverClass::MixedIntegerLinear
    }
}
