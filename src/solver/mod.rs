// Solver adapters: concrete SolverService backends and the dispatching adapter

pub mod adapter;
#[cfg(feature = "coin_cbc")]
pub mod coin_cbc_solver;
pub mod factory;
pub mod glpk_solver;
#[cfg(feature = "highs")]
pub mod highs_solver;
pub mod share_solver;

pub use adapter::SolverAdapter;
#[cfg(feature = "coin_cbc")]
pub use coin_cbc_solver::CoinCbcSolver;
pub use factory::{SolverFactory, UnavailableSolver};
pub use glpk_solver::GlpkSolver;
#[cfg(feature = "highs")]
pub use highs_solver::HighsSolver;
pub use share_solver::{BranchAndBoundOptions, ShareBranchAndBound};
