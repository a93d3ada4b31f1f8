// Domain layer: site data, model building and objective formulations
pub mod domain;

// Application layer: the solve pipeline and result interpretation
pub mod application;

// Infrastructure layer: configuration, CSV input and the async runtime wrapper
pub mod infrastructure;

// Solver adapters: concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    ConfigurationError, DataIntegrityError, Error, ObjectiveStrategy, RawOutcome, Result,
    SiteData, SiteModel, SolveRequest, SolverBackend, SolverClass, SolverConfig, SolverError,
    SolverService, StoreCategory, StoreLocation, StrategyKind,
};

pub use application::{BuiltModel, DecisionReport, PipelineStage, PlannerConfig, SitePlanner};

pub use infrastructure::{solve_with_timeout, AppConfig, CsvLoader, DataFiles};

pub use solver::{GlpkSolver, ShareBranchAndBound, SolverAdapter, SolverFactory};

#[cfg(feature = "highs")]
pub use solver::HighsSolver;

#[cfg(feature = "coin_cbc")]
pub use solver::CoinCbcSolver;
