// Domain value objects representing core business concepts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side of the market a physical store belongs to.
///
/// The tag is fixed when the store is loaded and is never re-derived from the
/// identifier afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreCategory {
    /// One of our stores that already operates (E)
    Existing,
    /// A competitor's store (C)
    Competitor,
    /// A site where we may open a new store (P)
    Potential,
}

impl StoreCategory {
    /// Classify an identifier by its leading letter: `E`, `C` or `P`.
    pub fn from_prefix(identifier: &str) -> Option<Self> {
        match identifier.chars().next() {
            Some('E') => Some(StoreCategory::Existing),
            Some('C') => Some(StoreCategory::Competitor),
            Some('P') => Some(StoreCategory::Potential),
            _ => None,
        }
    }
}

impl fmt::Display for StoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreCategory::Existing => write!(f, "existing"),
            StoreCategory::Competitor => write!(f, "competitor"),
            StoreCategory::Potential => write!(f, "potential"),
        }
    }
}

/// Formulation of captured market share used as the objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Huff-style ratio of utilities, nonlinear in the open decisions
    ExactShare,
    /// Inverse-distance-weighted demand, linear in the open decisions
    #[default]
    LinearProxy,
}

impl StrategyKind {
    /// The only class of solver that can handle this formulation
    pub fn solver_class(&self) -> SolverClass {
        match self {
            StrategyKind::ExactShare => SolverClass::MixedIntegerNonlinear,
            StrategyKind::LinearProxy => SolverClass::MixedIntegerLinear,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::ExactShare => write!(f, "Exact Share"),
            StrategyKind::LinearProxy => write!(f, "Linear Proxy"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact-share" | "exact" => Ok(StrategyKind::ExactShare),
            "linear-proxy" | "linear" => Ok(StrategyKind::LinearProxy),
            _ => Err(UnknownVariant::new("strategy", s)),
        }
    }
}

/// Class of mathematical program a solver can handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverClass {
    /// Mixed-integer linear programs (MILP)
    MixedIntegerLinear,
    /// Mixed-integer nonlinear programs (MINLP)
    MixedIntegerNonlinear,
}

impl fmt::Display for SolverClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverClass::MixedIntegerLinear => write!(f, "mixed-integer linear"),
            SolverClass::MixedIntegerNonlinear => write!(f, "mixed-integer nonlinear"),
        }
    }
}

/// Whether the solver could be run at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// The solver ran to a termination condition
    Ok,
    /// The solver could not be located or invoked
    SolverUnavailable,
    /// The solver was invoked but failed or was killed
    SolverError,
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Ok => write!(f, "ok"),
            OutcomeStatus::SolverUnavailable => write!(f, "solver-unavailable"),
            OutcomeStatus::SolverError => write!(f, "solver-error"),
        }
    }
}

/// Why the solver stopped, passed through from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationCondition {
    /// Proven optimal solution found
    Optimal,
    /// No assignment satisfies the constraints
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
    /// Anything else (time limit, node limit, numerical trouble), with the raw text
    Other(String),
}

impl fmt::Display for TerminationCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationCondition::Optimal => write!(f, "optimal"),
            TerminationCondition::Infeasible => write!(f, "infeasible"),
            TerminationCondition::Unbounded => write!(f, "unbounded"),
            TerminationCondition::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// Solver backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolverBackend {
    /// Pick the default backend for the strategy's solver class
    #[default]
    Auto,
    /// HiGHS, linked in-process
    Highs,
    /// COIN-OR CBC through good_lp
    CoinCbc,
    /// GNU GLPK's `glpsol`, run as an external process
    Glpk,
    /// Branch-and-bound over the open decisions for the share ratio objective
    #[serde(rename = "share-bnb")]
    ShareBranchAndBound,
}

impl SolverBackend {
    /// Class of program the backend solves; `None` for `Auto`
    pub fn solver_class(&self) -> Option<SolverClass> {
        match self {
            SolverBackend::Auto => None,
            SolverBackend::Highs | SolverBackend::CoinCbc | SolverBackend::Glpk => {
                Some(SolverClass::MixedIntegerLinear)
            }
            SolverBackend::ShareBranchAndBound => Some(SolverClass::MixedIntegerNonlinear),
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::Highs => write!(f, "HiGHS"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
            SolverBackend::Glpk => write!(f, "GLPK"),
            SolverBackend::ShareBranchAndBound => write!(f, "Share Branch-and-Bound"),
        }
    }
}

impl FromStr for SolverBackend {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(SolverBackend::Auto),
            "highs" => Ok(SolverBackend::Highs),
            "coin-cbc" | "cbc" => Ok(SolverBackend::CoinCbc),
            "glpk" | "glpsol" => Ok(SolverBackend::Glpk),
            "share-bnb" | "bnb" => Ok(SolverBackend::ShareBranchAndBound),
            _ => Err(UnknownVariant::new("solver backend", s)),
        }
    }
}

/// Returned when parsing a value object from text fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
