// Result interpreter: turns a raw solver outcome into the business decision

use serde::Serialize;
use std::fmt;

use crate::domain::{
    models::RawOutcome,
    value_objects::{OutcomeStatus, TerminationCondition},
};

pub use crate::domain::models::OPEN_THRESHOLD;

/// Terminal state of a pipeline run.
///
/// The earlier states are types: `SiteModel` is built, `BuiltModel` is ready
/// and is consumed while solving, so only the end state needs a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Optimal,
    Infeasible,
    Inconclusive,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Optimal => write!(f, "optimal"),
            PipelineStage::Infeasible => write!(f, "infeasible"),
            PipelineStage::Inconclusive => write!(f, "inconclusive"),
        }
    }
}

/// Final answer of a site selection run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum DecisionReport {
    /// Captured demand and the candidates to open, in candidate order
    Optimal {
        objective_value: f64,
        opened: Vec<String>,
    },
    /// No selection satisfies the budget
    Infeasible { budget: usize },
    /// The solver stopped without a usable answer; raw strings kept for diagnosis
    Inconclusive {
        status: String,
        termination: String,
        message: String,
    },
}

impl DecisionReport {
    /// Read a raw outcome against the candidate list it was solved for
    pub fn interpret(outcome: &RawOutcome, candidates: &[String], budget: usize) -> Self {
        match (outcome.status, &outcome.termination) {
            (OutcomeStatus::Ok, TerminationCondition::Optimal) => {
                Self::read_optimal(outcome, candidates, budget)
            }
            (OutcomeStatus::Ok, TerminationCondition::Infeasible) => {
                DecisionReport::Infeasible { budget }
            }
            _ => Self::inconclusive(outcome, outcome.message.clone()),
        }
    }

    fn read_optimal(outcome: &RawOutcome, candidates: &[String], budget: usize) -> Self {
        if outcome.variable_values.len() != candidates.len() {
            return Self::inconclusive(
                outcome,
                format!(
                    "solver returned {} values for {} candidates",
                    outcome.variable_values.len(),
                    candidates.len()
                ),
            );
        }
        let Some(objective_value) = outcome.objective_value else {
            return Self::inconclusive(outcome, "solver returned no objective value".to_string());
        };

        let opened: Vec<String> = candidates
            .iter()
            .zip(&outcome.variable_values)
            .filter(|(_, &value)| value > OPEN_THRESHOLD)
            .map(|(id, _)| id.clone())
            .collect();

        if opened.len() > budget {
            return Self::inconclusive(
                outcome,
                format!(
                    "assignment opens {} sites but the budget is {}",
                    opened.len(),
                    budget
                ),
            );
        }

        DecisionReport::Optimal {
            objective_value,
            opened,
        }
    }

    fn inconclusive(outcome: &RawOutcome, message: String) -> Self {
        DecisionReport::Inconclusive {
            status: outcome.status.to_string(),
            termination: outcome.termination.to_string(),
            message,
        }
    }

    pub fn stage(&self) -> PipelineStage {
        match self {
            DecisionReport::Optimal { .. } => PipelineStage::Optimal,
            DecisionReport::Infeasible { .. } => PipelineStage::Infeasible,
            DecisionReport::Inconclusive { .. } => PipelineStage::Inconclusive,
        }
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, DecisionReport::Optimal { .. })
    }

    pub fn objective_value(&self) -> Option<f64> {
        match self {
            DecisionReport::Optimal {
                objective_value, ..
            } => Some(*objective_value),
            _ => None,
        }
    }

    /// Candidates to open; empty unless the run was optimal
    pub fn opened(&self) -> &[String] {
        match self {
            DecisionReport::Optimal { opened, .. } => opened,
            _ => &[],
        }
    }
}

impl fmt::Display for DecisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionReport::Optimal {
                objective_value,
                opened,
            } => {
                writeln!(f, "Optimal locations for new stores:")?;
                for store in opened {
                    writeln!(f, "  {}", store)?;
                }
                write!(f, "Captured demand: {:.4}", objective_value)
            }
            DecisionReport::Infeasible { budget } => write!(
                f,
                "Infeasible: no selection of sites is feasible under a budget of {}",
                budget
            ),
            DecisionReport::Inconclusive {
                status,
                termination,
                message,
            } => write!(
                f,
                "Inconclusive (status: {}, termination: {}): {}",
                status, termination, message
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<String> {
        vec!["X".to_string(), "Y".to_string(), "Z".to_string()]
    }

    #[test]
    fn test_threshold_tolerates_solver_slack() {
        let outcome = RawOutcome::optimal(75.0, vec![0.9999999, 1e-7, 1.0000002]);
        let report = DecisionReport::interpret(&outcome, &candidates(), 2);

        assert_eq!(
            report,
            DecisionReport::Optimal {
                objective_value: 75.0,
                opened: vec!["X".to_string(), "Z".to_string()],
            }
        );
        assert_eq!(report.stage(), PipelineStage::Optimal);
    }

    #[test]
    fn test_exactly_half_is_not_open() {
        let outcome = RawOutcome::optimal(10.0, vec![0.5, 0.0, 0.0]);
        let report = DecisionReport::interpret(&outcome, &candidates(), 1);
        assert!(report.opened().is_empty());
    }

    #[test]
    fn test_infeasible_outcome() {
        let outcome = RawOutcome::terminated(TerminationCondition::Infeasible, "no");
        let report = DecisionReport::interpret(&outcome, &candidates(), 4);

        assert_eq!(report, DecisionReport::Infeasible { budget: 4 });
        assert_eq!(report.objective_value(), None);
        assert!(report.to_string().contains("budget of 4"));
    }

    #[test]
    fn test_other_terminations_are_inconclusive() {
        let outcome = RawOutcome::terminated(
            TerminationCondition::Other("ReachedTimeLimit".to_string()),
            "HiGHS stopped",
        );
        let report = DecisionReport::interpret(&outcome, &candidates(), 1);

        assert_eq!(
            report,
            DecisionReport::Inconclusive {
                status: "ok".to_string(),
                termination: "ReachedTimeLimit".to_string(),
                message: "HiGHS stopped".to_string(),
            }
        );

        let unbounded = RawOutcome::terminated(TerminationCondition::Unbounded, "up");
        assert_eq!(
            DecisionReport::interpret(&unbounded, &candidates(), 1).stage(),
            PipelineStage::Inconclusive
        );
    }

    #[test]
    fn test_solver_failures_are_inconclusive() {
        let failed = RawOutcome::failed("GLPK", "glpsol exited with status 1");
        let report = DecisionReport::interpret(&failed, &candidates(), 1);

        match report {
            DecisionReport::Inconclusive {
                status, message, ..
            } => {
                assert_eq!(status, "solver-error");
                assert_eq!(message, "glpsol exited with status 1");
            }
            other => panic!("unexpected report {:?}", other),
        }

        let unavailable = RawOutcome::unavailable("GLPK", "not on PATH");
        assert!(!DecisionReport::interpret(&unavailable, &candidates(), 1).is_optimal());
    }

    #[test]
    fn test_malformed_optimal_outcomes() {
        let short = RawOutcome::optimal(1.0, vec![1.0]);
        assert_eq!(
            DecisionReport::interpret(&short, &candidates(), 3).stage(),
            PipelineStage::Inconclusive
        );

        let mut missing_value = RawOutcome::optimal(1.0, vec![1.0, 0.0, 0.0]);
        missing_value.objective_value = None;
        assert_eq!(
            DecisionReport::interpret(&missing_value, &candidates(), 3).stage(),
            PipelineStage::Inconclusive
        );

        let over_budget = RawOutcome::optimal(1.0, vec![1.0, 1.0, 0.0]);
        assert_eq!(
            DecisionReport::interpret(&over_budget, &candidates(), 1).stage(),
            PipelineStage::Inconclusive
        );
    }

    #[test]
    fn test_every_report_ends_in_a_terminal_stage() {
        let optimal = RawOutcome::optimal(1.0, vec![1.0, 0.0, 0.0]);
        let failed = RawOutcome::failed("GLPK", "boom");
        let reports = [
            DecisionReport::interpret(&optimal, &candidates(), 1),
            DecisionReport::Infeasible { budget: 1 },
            DecisionReport::interpret(&failed, &candidates(), 1),
        ];
        let names: Vec<String> = reports.iter().map(|r| r.stage().to_string()).collect();
        assert_eq!(names, ["optimal", "infeasible", "inconclusive"]);
    }

    #[test]
    fn test_json_shape() {
        let report = DecisionReport::Optimal {
            objective_value: 50.0,
            opened: vec!["X".to_string()],
        };
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["outcome"], "optimal");
        assert_eq!(json["objective_value"], 50.0);
        assert_eq!(json["opened"][0], "X");
    }
}
