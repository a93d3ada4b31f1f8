// Solver adapter: checks the strategy / solver pairing, dispatches the request
// and normalizes how the backend ended into a raw outcome

use crate::domain::{
    error::ConfigurationError,
    models::{RawOutcome, SolveRequest, SolverConfig},
    solver_service::{SolverError, SolverService},
    value_objects::{SolverClass, StrategyKind},
};
use crate::solver::SolverFactory;
use std::sync::Arc;
use tracing::{debug, info};

pub struct SolverAdapter {
    solver: Arc<dyn SolverService>,
    config: SolverConfig,
}

impl SolverAdapter {
    /// Pick the backend named in `config` for `strategy`.
    ///
    /// Fails before anything runs when the backend cannot solve the
    /// strategy's class of program.
    pub fn for_strategy(
        config: &SolverConfig,
        strategy: StrategyKind,
    ) -> Result<Self, ConfigurationError> {
        let required = strategy.solver_class();
        let backend = SolverFactory::resolve(config.backend, required);

        if let Some(provided) = backend.solver_class() {
            if provided != required {
                return Err(ConfigurationError::SolverClassMismatch {
                    strategy,
                    backend: backend.to_string(),
                    required,
                    provided,
                });
            }
        }

        Ok(Self {
            solver: SolverFactory::create_from_backend(backend, required),
            config: config.clone(),
        })
    }

    /// Wrap an already constructed solver
    pub fn with_solver(solver: Arc<dyn SolverService>, config: SolverConfig) -> Self {
        Self { solver, config }
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    pub fn solver_class(&self) -> SolverClass {
        self.solver.solver_class()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Send the request to the backend and return what it reported.
    ///
    /// No retries and no fallback: an unavailable or failing backend shows up
    /// in the outcome status, a mismatched pairing is refused up front.
    pub fn dispatch(&self, request: &SolveRequest) -> Result<RawOutcome, ConfigurationError> {
        let provided = self.solver.solver_class();
        let required = request.objective.solver_class();
        if provided != required || request.solver_class != required {
            return Err(ConfigurationError::SolverClassMismatch {
                strategy: request.objective.kind(),
                backend: self.solver.name().to_string(),
                required,
                provided,
            });
        }

        info!(
            solver = self.solver.name(),
            strategy = %request.objective.kind(),
            variables = request.num_variables(),
            "dispatching solve request"
        );

        match self.solver.solve(request) {
            Ok(outcome) => {
                debug!(
                    status = %outcome.status,
                    termination = %outcome.termination,
                    "solver returned"
                );
                Ok(outcome)
            }
            Err(SolverError::SolverNotAvailable(detail)) => {
                Ok(RawOutcome::unavailable(self.solver.name(), detail))
            }
            Err(SolverError::ExecutionFailed(detail)) => {
                Ok(RawOutcome::failed(self.solver.name(), detail))
            }
            Err(SolverError::InvalidRequest(detail)) => {
                Err(ConfigurationError::InvalidRequest(detail))
            }
        }
    }
}
