// Share Branch-and-Bound Solver
// Solves the mixed-integer nonlinear program behind the exact share objective by
// depth-first branch-and-bound over the open decisions

use crate::domain::{
    models::{Constraint, RawOutcome, SolveRequest, SolverStatistics},
    objective::{ObjectiveStrategy, ShareTerm},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{SolverClass, TerminationCondition},
};
use std::time::{Duration, Instant};
use tracing::debug;

const FEASIBILITY_TOL: f64 = 1e-9;
const TIME_CHECK_INTERVAL: u64 = 1024;

/// Options for the share branch-and-bound search
#[derive(Debug, Clone)]
pub struct BranchAndBoundOptions {
    /// Maximum number of nodes to explore
    pub max_nodes: u64,
    /// Relative optimality gap at which a subtree is pruned
    pub gap_tolerance: f64,
    /// Wall-clock budget for the search
    pub time_limit: Option<Duration>,
}

impl Default for BranchAndBoundOptions {
    fn default() -> Self {
        Self {
            max_nodes: 1_000_000,
            gap_tolerance: 0.0,
            time_limit: None,
        }
    }
}

impl BranchAndBoundOptions {
    pub fn from_request(request: &SolveRequest) -> Self {
        let defaults = Self::default();
        Self {
            max_nodes: request.config.max_nodes.unwrap_or(defaults.max_nodes),
            gap_tolerance: request.config.gap_tolerance.unwrap_or(defaults.gap_tolerance),
            time_limit: request
                .config
                .time_limit
                .filter(|t| t.is_finite() && *t > 0.0)
                .map(Duration::from_secs_f64),
        }
    }
}

/// Exact solver for the share objective under one packing constraint.
///
/// Every share term grows with the utility added by new stores, so a node's
/// bound is obtained by giving each demand location the largest utilities
/// still reachable within the remaining budget.
pub struct ShareBranchAndBound;

impl ShareBranchAndBound {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShareBranchAndBound {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for ShareBranchAndBound {
    fn solve(&self, request: &SolveRequest) -> Result<RawOutcome> {
        self.validate(request)?;

        let ObjectiveStrategy::ExactShare { terms, .. } = &request.objective else {
            return Err(SolverError::InvalidRequest(format!(
                "{} only solves the exact share objective, got {}",
                self.name(),
                request.objective.kind()
            )));
        };
        check_packing(&request.constraint)?;

        let start_time = Instant::now();
        let options = BranchAndBoundOptions::from_request(request);

        // The empty selection is the loosest point of a packing constraint
        if request.constraint.bound < -FEASIBILITY_TOL {
            let outcome = RawOutcome::terminated(
                TerminationCondition::Infeasible,
                "Problem is infeasible: no selection satisfies the budget",
            );
            return Ok(outcome
                .with_solver(self.name())
                .with_statistics(SolverStatistics::for_request(request, 0.0)));
        }

        let mut search = Search::new(terms, &request.constraint.coefficients, &options);
        search.run(request.constraint.bound);

        let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;
        let mut statistics = SolverStatistics::for_request(request, solve_time);
        statistics.nodes_explored = search.nodes;

        debug!(
            nodes = search.nodes,
            best = search.best_value,
            solve_time_ms = solve_time,
            "share branch-and-bound finished"
        );

        let outcome = match search.stopped {
            None => {
                let value = request.objective.evaluate(&search.best_assignment);
                RawOutcome::optimal(value, search.best_assignment)
            }
            Some(reason) => {
                let message = format!(
                    "search stopped early ({}) with best value {}",
                    reason, search.best_value
                );
                RawOutcome::terminated(reason, message)
            }
        };

        Ok(outcome.with_solver(self.name()).with_statistics(statistics))
    }

    fn name(&self) -> &str {
        "Share Branch-and-Bound"
    }

    fn solver_class(&self) -> SolverClass {
        SolverClass::MixedIntegerNonlinear
    }
}

fn check_packing(constraint: &Constraint) -> Result<()> {
    if constraint
        .coefficients
        .iter()
        .any(|c| !c.is_finite() || *c < 0.0)
    {
        return Err(SolverError::InvalidRequest(format!(
            "constraint '{}' must have nonnegative coefficients",
            constraint.name
        )));
    }
    Ok(())
}

struct Search<'a> {
    terms: &'a [ShareTerm],
    costs: &'a [f64],
    options: &'a BranchAndBoundOptions,
    order: Vec<usize>,
    started: Instant,
    nodes: u64,
    stopped: Option<TerminationCondition>,

    current: Vec<f64>,
    added: Vec<f64>,

    best_value: f64,
    best_assignment: Vec<f64>,
}

impl<'a> Search<'a> {
    fn new(terms: &'a [ShareTerm], costs: &'a [f64], options: &'a BranchAndBoundOptions) -> Self {
        let n = costs.len();

        // Branch on the most valuable single openings first
        let gains: Vec<f64> = (0..n)
            .map(|j| {
                terms
                    .iter()
                    .map(|t| {
                        let opened = t.share_with(t.candidate_utilities[j]);
                        t.weight * (opened - t.share_with(0.0))
                    })
                    .sum()
            })
            .collect();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| gains[b].total_cmp(&gains[a]).then(a.cmp(&b)));

        Self {
            terms,
            costs,
            options,
            order,
            started: Instant::now(),
            nodes: 0,
            stopped: None,
            current: vec![0.0; n],
            added: vec![0.0; terms.len()],
            best_value: 0.0,
            best_assignment: vec![0.0; n],
        }
    }

    fn run(&mut self, capacity: f64) {
        self.best_value = self.current_value();
        self.greedy(capacity);
        self.explore(0, capacity);
    }

    /// Seed the incumbent by repeatedly opening the best-paying site that still fits
    fn greedy(&mut self, capacity: f64) {
        let mut slack = capacity;
        loop {
            let base = self.current_value();
            let mut best: Option<(usize, f64)> = None;
            for position in 0..self.order.len() {
                let j = self.order[position];
                if self.current[j] > 0.5 || self.costs[j] > slack + FEASIBILITY_TOL {
                    continue;
                }
                self.set(j, 1.0);
                let gain = self.current_value() - base;
                self.set(j, 0.0);
                if gain > 0.0 && best.map_or(true, |(_, g)| gain > g) {
                    best = Some((j, gain));
                }
            }
            let Some((j, _)) = best else { break };
            self.set(j, 1.0);
            slack -= self.costs[j];
        }

        let value = self.current_value();
        if value > self.best_value {
            self.best_value = value;
            self.best_assignment = self.current.clone();
        }

        self.current.fill(0.0);
        self.added.fill(0.0);
    }

    fn explore(&mut self, depth: usize, slack: f64) {
        if self.stopped.is_some() {
            return;
        }
        self.nodes += 1;
        if self.nodes > self.options.max_nodes {
            self.stopped = Some(TerminationCondition::Other("node limit reached".to_string()));
            return;
        }
        if self.nodes % TIME_CHECK_INTERVAL == 0 {
            if let Some(limit) = self.options.time_limit {
                if self.started.elapsed() >= limit {
                    self.stopped =
                        Some(TerminationCondition::Other("time limit reached".to_string()));
                    return;
                }
            }
        }

        let value = self.current_value();
        if value > self.best_value + FEASIBILITY_TOL {
            self.best_value = value;
            self.best_assignment = self.current.clone();
        }

        if depth == self.order.len() {
            return;
        }
        let tolerance = FEASIBILITY_TOL * self.best_value.abs().max(1.0)
            + self.options.gap_tolerance * self.best_value.abs();
        if self.upper_bound(depth, slack) <= self.best_value + tolerance {
            return;
        }

        let j = self.order[depth];
        let cost = self.costs[j];
        if cost <= slack + FEASIBILITY_TOL {
            self.set(j, 1.0);
            self.explore(depth + 1, slack - cost);
            self.set(j, 0.0);
        }
        self.explore(depth + 1, slack);
    }

    /// Best value any completion of the current node could reach
    fn upper_bound(&self, depth: usize, slack: f64) -> f64 {
        let fitting: Vec<usize> = self.order[depth..]
            .iter()
            .copied()
            .filter(|&j| self.costs[j] <= slack + FEASIBILITY_TOL)
            .collect();

        // Most sites that could still be opened together: take the cheapest first
        let mut costs: Vec<f64> = fitting.iter().map(|&j| self.costs[j]).collect();
        costs.sort_by(f64::total_cmp);
        let mut used = 0.0;
        let mut picks = 0;
        for cost in costs {
            if used + cost > slack + FEASIBILITY_TOL {
                break;
            }
            used += cost;
            picks += 1;
        }

        self.terms
            .iter()
            .zip(&self.added)
            .map(|(term, &added)| {
                let mut utilities: Vec<f64> = fitting
                    .iter()
                    .map(|&j| term.candidate_utilities[j])
                    .collect();
                utilities.sort_by(|a, b| b.total_cmp(a));
                let extra: f64 = utilities.iter().take(picks).sum();
                term.weight * term.share_with(added + extra)
            })
            .sum()
    }

    fn current_value(&self) -> f64 {
        self.terms
            .iter()
            .zip(&self.added)
            .map(|(term, &added)| term.weight * term.share_with(added))
            .sum()
    }

    fn set(&mut self, j: usize, value: f64) {
        let delta = value - self.current[j];
        if delta == 0.0 {
            return;
        }
        for (added, term) in self.added.iter_mut().zip(self.terms) {
            *added += delta * term.candidate_utilities[j];
        }
        self.current[j] = value;
    }
}
