// Site selection pipeline: data -> built model -> solver -> decision report

use serde::Deserialize;
use tracing::{info, warn};

use crate::application::report::DecisionReport;
use crate::domain::{
    error::{Error, Result},
    models::{Constraint, SolveRequest, SolverConfig},
    objective::ObjectiveStrategy,
    site_data::SiteData,
    site_model::{SiteModel, DEFAULT_BUDGET},
    value_objects::{OutcomeStatus, StrategyKind},
};
use crate::solver::SolverAdapter;

/// What to solve and with which solver
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum number of new stores to open
    pub budget: usize,
    pub strategy: StrategyKind,
    pub solver: SolverConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            strategy: StrategyKind::default(),
            solver: SolverConfig::default(),
        }
    }
}

/// A validated model with its objective and budget constraint attached.
///
/// Solving consumes it; build a new one to solve again.
#[derive(Debug, Clone)]
pub struct BuiltModel {
    model: SiteModel,
    objective: ObjectiveStrategy,
    constraint: Constraint,
}

impl BuiltModel {
    pub fn new(model: SiteModel, strategy: StrategyKind) -> Self {
        let objective = ObjectiveStrategy::for_model(strategy, &model);
        let constraint = Constraint::budget(model.candidates().len(), model.budget());
        Self {
            model,
            objective,
            constraint,
        }
    }

    pub fn model(&self) -> &SiteModel {
        &self.model
    }

    pub fn objective(&self) -> &ObjectiveStrategy {
        &self.objective
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Assemble the program handed to a solver backend
    pub fn request(&self, config: &SolverConfig) -> SolveRequest {
        SolveRequest {
            name: format!("site-selection-{}", self.objective.kind()),
            variables: self.model.variables().to_vec(),
            objective: self.objective.clone(),
            constraint: self.constraint.clone(),
            solver_class: self.objective.solver_class(),
            config: config.clone(),
        }
    }

    /// Dispatch to the adapter and interpret what comes back
    pub fn solve(self, adapter: &SolverAdapter) -> Result<DecisionReport> {
        let request = self.request(adapter.config());
        let outcome = adapter.dispatch(&request)?;

        if outcome.status == OutcomeStatus::SolverUnavailable {
            return Err(Error::SolverUnavailable {
                solver: outcome.solver,
                detail: outcome.message,
            });
        }

        let report =
            DecisionReport::interpret(&outcome, self.model.candidates(), self.model.budget());
        match &report {
            DecisionReport::Optimal {
                objective_value,
                opened,
            } => info!(
                solver = %outcome.solver,
                objective = objective_value,
                opened = opened.len(),
                "optimal selection found"
            ),
            DecisionReport::Infeasible { budget } => {
                warn!(budget, "no feasible selection")
            }
            DecisionReport::Inconclusive {
                status,
                termination,
                message,
            } => warn!(%status, %termination, %message, "solve was inconclusive"),
        }
        Ok(report)
    }
}

/// Runs the whole pipeline for one configuration
#[derive(Debug, Clone, Default)]
pub struct SitePlanner {
    config: PlannerConfig,
}

impl SitePlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Pair the strategy with a solver first, then build and solve.
    ///
    /// A mismatched pairing is reported before the data is even validated.
    pub fn plan(&self, data: SiteData) -> Result<DecisionReport> {
        let adapter = SolverAdapter::for_strategy(&self.config.solver, self.config.strategy)?;
        info!(
            strategy = %self.config.strategy,
            solver = adapter.solver_name(),
            budget = self.config.budget,
            "planning site selection"
        );

        let model = SiteModel::build(data, self.config.budget)?;
        BuiltModel::new(model, self.config.strategy).solve(&adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::report::PipelineStage;
    use crate::domain::{
        error::ConfigurationError,
        models::RawOutcome,
        site_data::StoreLocation,
        solver_service::{self, SolverService},
        value_objects::{SolverBackend, SolverClass, TerminationCondition},
    };
    use crate::solver::UnavailableSolver;
    use std::sync::Arc;

    fn scenario() -> SiteData {
        SiteData::new()
            .with_demand_location("A")
            .with_demand_location("B")
            .with_segment("s")
            .with_candidate("X")
            .with_candidate("Y")
            .with_store(StoreLocation::competitor("C1"))
            .with_demand("A", "s", 100.0)
            .with_demand("B", "s", 50.0)
            .with_distance("A", "X", 2.0)
            .with_distance("A", "Y", 4.0)
            .with_distance("B", "X", 4.0)
            .with_distance("B", "Y", 1.0)
            .with_distance("A", "C1", 1.0)
            .with_distance("B", "C1", 1.0)
            .with_no_choice_utility("A", 0.0)
            .with_no_choice_utility("B", 0.0)
    }

    /// Answers every request with a fixed outcome
    struct Scripted(RawOutcome, SolverClass);

    impl SolverService for Scripted {
        fn solve(&self, _request: &SolveRequest) -> solver_service::Result<RawOutcome> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn solver_class(&self) -> SolverClass {
            self.1
        }
    }

    #[test]
    fn test_built_model_request() {
        let model = SiteModel::build(scenario(), 1).unwrap();
        let built = BuiltModel::new(model, StrategyKind::LinearProxy);
        let request = built.request(&SolverConfig::default());

        assert_eq!(request.num_variables(), 2);
        assert_eq!(request.variables[1].name, "x[Y]");
        assert_eq!(request.constraint.bound, 1.0);
        assert_eq!(request.solver_class, SolverClass::MixedIntegerLinear);
        assert_eq!(
            built.objective().linear_coefficients(),
            Some(&[62.5, 75.0][..])
        );
    }

    #[test]
    fn test_exact_share_through_planner() {
        let planner = SitePlanner::new(PlannerConfig {
            budget: 1,
            strategy: StrategyKind::ExactShare,
            ..PlannerConfig::default()
        });
        let report = planner.plan(scenario()).unwrap();

        assert_eq!(report.opened(), &["Y".to_string()]);
        let value = report.objective_value().unwrap();
        assert!((value - (100.0 / 9.0 + 50.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn test_market_without_candidates_reports_positive_zero() {
        let data = SiteData::new()
            .with_demand_location("A")
            .with_segment("s")
            .with_demand("A", "s", 100.0);
        let planner = SitePlanner::new(PlannerConfig {
            budget: 0,
            strategy: StrategyKind::ExactShare,
            ..PlannerConfig::default()
        });

        let report = planner.plan(data).unwrap();
        let value = report.objective_value().unwrap();
        assert!(report.opened().is_empty());
        assert!(value == 0.0 && value.is_sign_positive(), "{value}");
        assert!(report.to_string().ends_with("Captured demand: 0.0000"));
    }

    #[test]
    fn test_mismatch_is_reported_before_data_checks() {
        let planner = SitePlanner::new(PlannerConfig {
            strategy: StrategyKind::ExactShare,
            solver: SolverConfig {
                backend: SolverBackend::Glpk,
                ..SolverConfig::default()
            },
            ..PlannerConfig::default()
        });
        let broken = scenario().with_distance("A", "X", 0.0);

        let err = planner.plan(broken).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigurationError::SolverClassMismatch { .. })
        ));
    }

    #[test]
    fn test_data_integrity_error_surfaces() {
        let planner = SitePlanner::new(PlannerConfig::default());
        let err = planner
            .plan(scenario().with_demand("A", "s", -1.0))
            .unwrap_err();

        match err {
            Error::DataIntegrity(inner) => assert_eq!(inner.invariant(), "nonnegative-demand"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_unavailable_solver_is_an_error() {
        let model = SiteModel::build(scenario(), 1).unwrap();
        let solver = UnavailableSolver::new(
            "HiGHS",
            SolverClass::MixedIntegerLinear,
            "not compiled in",
        );
        let adapter = SolverAdapter::with_solver(Arc::new(solver), SolverConfig::default());

        let err = BuiltModel::new(model, StrategyKind::LinearProxy)
            .solve(&adapter)
            .unwrap_err();
        assert!(matches!(err, Error::SolverUnavailable { ref solver, .. } if solver == "HiGHS"));
    }

    #[test]
    fn test_scripted_outcomes_map_to_stages() {
        let cases = [
            (RawOutcome::optimal(75.0, vec![1.0, 0.0]), PipelineStage::Optimal),
            (
                RawOutcome::terminated(TerminationCondition::Infeasible, "none"),
                PipelineStage::Infeasible,
            ),
            (
                RawOutcome::failed("scripted", "crashed"),
                PipelineStage::Inconclusive,
            ),
        ];

        for (outcome, stage) in cases {
            let model = SiteModel::build(scenario(), 1).unwrap();
            let adapter = SolverAdapter::with_solver(
                Arc::new(Scripted(outcome, SolverClass::MixedIntegerLinear)),
                SolverConfig::default(),
            );
            let report = BuiltModel::new(model, StrategyKind::LinearProxy)
                .solve(&adapter)
                .unwrap();
            assert_eq!(report.stage(), stage);
        }
    }
}
