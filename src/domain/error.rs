// Error taxonomy for the site selection pipeline
// Infeasibility and inconclusive terminations are reports, not errors

use super::value_objects::{SolverClass, StrategyKind};

/// Malformed or inconsistent input caught while building the model
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataIntegrityError {
    #[error("identifier '{identifier}' appears more than once in set {set}")]
    DuplicateIdentifier {
        set: &'static str,
        identifier: String,
    },

    #[error("store '{identifier}' has no recognised category prefix (expected E, C or P)")]
    UnclassifiedStore { identifier: String },

    #[error(
        "candidate set J and potential stores P differ \
         (only in J: {only_in_candidates:?}, only in P: {only_in_potential:?})"
    )]
    CandidateMismatch {
        only_in_candidates: Vec<String>,
        only_in_potential: Vec<String>,
    },

    #[error("distance d[{location}, {store}] = {value} must be positive and finite")]
    NonPositiveDistance {
        location: String,
        store: String,
        value: f64,
    },

    #[error("demand h[{location}, {segment}] = {value} must be nonnegative and finite")]
    InvalidDemand {
        location: String,
        segment: String,
        value: f64,
    },

    #[error("no-choice utility v0[{location}] = {value} must be finite")]
    InvalidNoChoiceUtility { location: String, value: f64 },

    #[error("{table} references '{identifier}', which is not in set {set}")]
    UnknownIdentifier {
        table: &'static str,
        set: &'static str,
        identifier: String,
    },
}

impl DataIntegrityError {
    /// Name of the invariant the input violated
    pub fn invariant(&self) -> &'static str {
        match self {
            DataIntegrityError::DuplicateIdentifier { .. } => "unique-identifiers",
            DataIntegrityError::UnclassifiedStore { .. } => "store-partition",
            DataIntegrityError::CandidateMismatch { .. } => "potential-equals-candidates",
            DataIntegrityError::NonPositiveDistance { .. } => "positive-distance",
            DataIntegrityError::InvalidDemand { .. } => "nonnegative-demand",
            DataIntegrityError::InvalidNoChoiceUtility { .. } => "finite-no-choice-utility",
            DataIntegrityError::UnknownIdentifier { .. } => "table-keys-in-domain",
        }
    }
}

/// Mismatched pieces declared before anything is dispatched
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error(
        "{strategy} objective needs a {required} solver, but {backend} is a {provided} solver"
    )]
    SolverClassMismatch {
        strategy: StrategyKind,
        backend: String,
        required: SolverClass,
        provided: SolverClass,
    },

    #[error("solve request is malformed: {0}")]
    InvalidRequest(String),
}

/// Errors returned to whoever runs the pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("data integrity violation ({invariant}): {0}", invariant = .0.invariant())]
    DataIntegrity(#[from] DataIntegrityError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("solver {solver} unavailable: {detail}")]
    SolverUnavailable { solver: String, detail: String },
}

pub type Result<T> = std::result::Result<T, Error>;
