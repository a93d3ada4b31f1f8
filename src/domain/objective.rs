// Objective strategies: two interchangeable formulations of captured market share

use super::site_model::SiteModel;
use super::value_objects::{SolverClass, StrategyKind};

/// Share of one demand location's customers that our network captures.
///
/// share = (base_numerator + Σ_j u_j·x_j) / (base_denominator + Σ_j u_j·x_j)
#[derive(Debug, Clone, PartialEq)]
pub struct ShareTerm {
    pub location: String,
    /// Σ_s h[i, s]
    pub weight: f64,
    /// Utility of our existing stores, Σ_{m∈E} 1/d[i, m]
    pub base_numerator: f64,
    /// Utility of every store already in the market plus exp(v0[i])
    pub base_denominator: f64,
    /// 1/d[i, j] for each candidate, in candidate order
    pub candidate_utilities: Vec<f64>,
}

impl ShareTerm {
    /// Utility added by the candidates switched on in `assignment`
    pub fn added_utility(&self, assignment: &[f64]) -> f64 {
        self.candidate_utilities
            .iter()
            .zip(assignment)
            .map(|(u, x)| u * x)
            .sum()
    }

    /// Choice probability for our network at this location
    pub fn share(&self, assignment: &[f64]) -> f64 {
        self.share_with(self.added_utility(assignment))
    }

    /// Choice probability once `added` utility from new stores is in play
    pub fn share_with(&self, added: f64) -> f64 {
        let denominator = self.base_denominator + added;
        // exp(v0) can underflow to zero; with no stores in reach nothing is captured
        if denominator > 0.0 {
            (self.base_numerator + added) / denominator
        } else {
            0.0
        }
    }
}

/// How captured market share is scored, tagged by formulation.
///
/// Each variant only carries what its formulation needs, and the tag alone
/// decides which class of solver may be used.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectiveStrategy {
    /// Σ_i Σ_s h[i, s] · share(i); nonlinear because x sits in both halves of the ratio
    ExactShare {
        terms: Vec<ShareTerm>,
        num_candidates: usize,
    },
    /// Σ_i Σ_s h[i, s] · Σ_j x_j / d[i, j]; one coefficient per candidate
    LinearProxy { coefficients: Vec<f64> },
}

impl ObjectiveStrategy {
    pub fn for_model(kind: StrategyKind, model: &SiteModel) -> Self {
        match kind {
            StrategyKind::ExactShare => Self::exact_share(model),
            StrategyKind::LinearProxy => Self::linear_proxy(model),
        }
    }

    pub fn exact_share(model: &SiteModel) -> Self {
        let candidate_stores = model.candidate_store_indices();

        let terms = model
            .demand_locations()
            .iter()
            .enumerate()
            .map(|(i, location)| {
                let existing: f64 = model
                    .existing_store_indices()
                    .iter()
                    .map(|&m| model.utility_at(i, m))
                    .sum();
                let competitors: f64 = model
                    .competitor_store_indices()
                    .iter()
                    .map(|&m| model.utility_at(i, m))
                    .sum();

                ShareTerm {
                    location: location.clone(),
                    weight: model.total_demand_at(i),
                    base_numerator: existing,
                    base_denominator: existing + competitors + model.no_choice_at(i).exp(),
                    candidate_utilities: candidate_stores
                        .iter()
                        .map(|&m| model.utility_at(i, m))
                        .collect(),
                }
            })
            .collect();

        ObjectiveStrategy::ExactShare {
            terms,
            num_candidates: candidate_stores.len(),
        }
    }

    pub fn linear_proxy(model: &SiteModel) -> Self {
        let n_locations = model.demand_locations().len();

        let coefficients = model
            .candidate_store_indices()
            .iter()
            .map(|&m| {
                (0..n_locations)
                    .map(|i| model.total_demand_at(i) * model.utility_at(i, m))
                    .sum()
            })
            .collect();

        ObjectiveStrategy::LinearProxy { coefficients }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            ObjectiveStrategy::ExactShare { .. } => StrategyKind::ExactShare,
            ObjectiveStrategy::LinearProxy { .. } => StrategyKind::LinearProxy,
        }
    }

    pub fn solver_class(&self) -> SolverClass {
        self.kind().solver_class()
    }

    pub fn num_variables(&self) -> usize {
        match self {
            ObjectiveStrategy::ExactShare { num_candidates, .. } => *num_candidates,
            ObjectiveStrategy::LinearProxy { coefficients } => coefficients.len(),
        }
    }

    /// Objective coefficients when the formulation is linear
    pub fn linear_coefficients(&self) -> Option<&[f64]> {
        match self {
            ObjectiveStrategy::LinearProxy { coefficients } => Some(coefficients),
            ObjectiveStrategy::ExactShare { .. } => None,
        }
    }

    /// Captured demand for a value assignment of the open decisions.
    ///
    /// Folds from `+0.0`: an empty `f64` sum is `-0.0`, which would print as
    /// a negative objective.
    pub fn evaluate(&self, assignment: &[f64]) -> f64 {
        match self {
            ObjectiveStrategy::ExactShare { terms, .. } => terms
                .iter()
                .map(|term| term.weight * term.share(assignment))
                .fold(0.0, |acc, v| acc + v),
            ObjectiveStrategy::LinearProxy { coefficients } => coefficients
                .iter()
                .zip(assignment)
                .map(|(c, x)| c * x)
                .fold(0.0, |acc, v| acc + v),
        }
    }
}
