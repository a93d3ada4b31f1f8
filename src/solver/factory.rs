use crate::domain::{
    models::{RawOutcome, SolveRequest},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{SolverBackend, SolverClass},
};
#[cfg(feature = "coin_cbc")]
use crate::solver::CoinCbcSolver;
#[cfg(feature = "highs")]
use crate::solver::HighsSolver;
use crate::solver::{GlpkSolver, ShareBranchAndBound};
use std::sync::Arc;

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Concrete backend `Auto` stands for, given the class of program to solve
    pub fn resolve(backend: SolverBackend, class: SolverClass) -> SolverBackend {
        match (backend, class) {
            (SolverBackend::Auto, SolverClass::MixedIntegerLinear) => {
                if cfg!(feature = "highs") {
                    SolverBackend::Highs
                } else if cfg!(feature = "coin_cbc") {
                    SolverBackend::CoinCbc
                } else {
                    SolverBackend::Glpk
                }
            }
            (SolverBackend::Auto, SolverClass::MixedIntegerNonlinear) => {
                SolverBackend::ShareBranchAndBound
            }
            (explicit, _) => explicit,
        }
    }

    /// Create a solver for a specific backend.
    ///
    /// Backends that were not compiled in are still returned; they report
    /// themselves unavailable when asked to solve.
    pub fn create_from_backend(
        backend: SolverBackend,
        class: SolverClass,
    ) -> Arc<dyn SolverService> {
        match Self::resolve(backend, class) {
            SolverBackend::Highs => Self::highs(),
            SolverBackend::CoinCbc => Self::coin_cbc(),
            SolverBackend::Glpk => Arc::new(GlpkSolver::new()),
            SolverBackend::ShareBranchAndBound | SolverBackend::Auto => {
                Arc::new(ShareBranchAndBound::new())
            }
        }
    }

    #[cfg(feature = "highs")]
    fn highs() -> Arc<dyn SolverService> {
        Arc::new(HighsSolver::new())
    }

    #[cfg(not(feature = "highs"))]
    fn highs() -> Arc<dyn SolverService> {
        Arc::new(UnavailableSolver::new(
            "HiGHS",
            SolverClass::MixedIntegerLinear,
            "built without the `highs` feature",
        ))
    }

    #[cfg(feature = "coin_cbc")]
    fn coin_cbc() -> Arc<dyn SolverService> {
        Arc::new(CoinCbcSolver::new())
    }

    #[cfg(not(feature = "coin_cbc"))]
    fn coin_cbc() -> Arc<dyn SolverService> {
        Arc::new(UnavailableSolver::new(
            "COIN-OR CBC",
            SolverClass::MixedIntegerLinear,
            "built without the `coin_cbc` feature",
        ))
    }
}

/// Stand-in for a backend that cannot be invoked in this build
pub struct UnavailableSolver {
    name: String,
    class: SolverClass,
    reason: String,
}

impl UnavailableSolver {
    pub fn new(name: impl Into<String>, class: SolverClass, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class,
            reason: reason.into(),
        }
    }
}

impl SolverService for UnavailableSolver {
    fn solve(&self, _request: &SolveRequest) -> Result<RawOutcome> {
        Err(SolverError::SolverNotAvailable(format!(
            "{} is {}",
            self.name, self.reason
        )))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn solver_class(&self) -> SolverClass {
        self.class
    }
}
