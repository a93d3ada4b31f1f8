//! Exact Share branch-and-bound checked against brute force

use storeopt::{
    BuiltModel, PlannerConfig, SiteData, SiteModel, SitePlanner, SolverBackend, SolverConfig,
    StoreLocation, StrategyKind,
};

const CANDIDATES: usize = 6;

/// Five locations with existing and competitor stores and uneven demand
fn market() -> SiteData {
    let mut data = SiteData::new()
        .with_segment("walk-in")
        .with_segment("delivery")
        .with_store(StoreLocation::existing("E1"))
        .with_store(StoreLocation::existing("E2"))
        .with_store(StoreLocation::competitor("C1"));
    for j in 0..CANDIDATES {
        data = data.with_candidate(format!("P{j}"));
    }
    for i in 0..5 {
        let location = format!("L{i}");
        data = data
            .with_demand_location(location.clone())
            .with_demand(location.clone(), "walk-in", 20.0 + 11.0 * i as f64)
            .with_demand(location.clone(), "delivery", 50.0 - 7.0 * i as f64)
            .with_distance(location.clone(), "E1", 1.5 + i as f64)
            .with_distance(location.clone(), "E2", 6.0 - i as f64)
            .with_distance(location.clone(), "C1", 0.8 + 0.4 * i as f64)
            .with_no_choice_utility(location.clone(), -0.5 + 0.3 * i as f64);
        for j in 0..CANDIDATES {
            let d = 0.5 + ((5 * i + 3 * j + i * j) % 13) as f64 * 0.6;
            data = data.with_distance(location.clone(), format!("P{j}"), d);
        }
    }
    data
}

fn exact_planner(budget: usize) -> SitePlanner {
    SitePlanner::new(PlannerConfig {
        budget,
        strategy: StrategyKind::ExactShare,
        solver: SolverConfig {
            backend: SolverBackend::ShareBranchAndBound,
            ..SolverConfig::default()
        },
    })
}

/// Best objective over every subset of at most `budget` candidates
fn brute_force(budget: usize) -> f64 {
    let model = SiteModel::build(market(), budget).unwrap();
    let built = BuiltModel::new(model, StrategyKind::ExactShare);

    (0u32..1 << CANDIDATES)
        .filter(|mask| mask.count_ones() as usize <= budget)
        .map(|mask| {
            let assignment: Vec<f64> = (0..CANDIDATES)
                .map(|j| if mask & (1 << j) != 0 { 1.0 } else { 0.0 })
                .collect();
            built.objective().evaluate(&assignment)
        })
        .fold(f64::NEG_INFINITY, f64::max)
}

#[test]
fn test_branch_and_bound_matches_enumeration() {
    for budget in 0..=CANDIDATES {
        let report = exact_planner(budget).plan(market()).unwrap();
        let expected = brute_force(budget);
        let value = report.objective_value().unwrap();

        assert!(
            (value - expected).abs() < 1e-6,
            "budget {budget}: got {value}, enumeration found {expected}"
        );
        assert!(report.opened().len() <= budget);
    }
}

#[test]
fn test_reported_value_matches_opened_sites() {
    let report = exact_planner(3).plan(market()).unwrap();

    let model = SiteModel::build(market(), 3).unwrap();
    let assignment: Vec<f64> = model
        .candidates()
        .iter()
        .map(|id| if report.opened().contains(id) { 1.0 } else { 0.0 })
        .collect();
    let built = BuiltModel::new(model, StrategyKind::ExactShare);

    let recomputed = built.objective().evaluate(&assignment);
    assert!((recomputed - report.objective_value().unwrap()).abs() < 1e-9);
}

#[test]
fn test_share_never_decreases_with_budget() {
    let values: Vec<f64> = (0..=CANDIDATES)
        .map(|budget| {
            exact_planner(budget)
                .plan(market())
                .unwrap()
                .objective_value()
                .unwrap()
        })
        .collect();

    for pair in values.windows(2) {
        assert!(pair[1] + 1e-6 >= pair[0], "{:?}", values);
    }
}

#[test]
fn test_same_input_same_report() {
    let first = exact_planner(2).plan(market()).unwrap();
    let second = exact_planner(2).plan(market()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_auto_backend_solves_exact_share() {
    let planner = SitePlanner::new(PlannerConfig {
        budget: 2,
        strategy: StrategyKind::ExactShare,
        ..PlannerConfig::default()
    });
    let report = planner.plan(market()).unwrap();

    assert!(report.is_optimal());
    assert!((report.objective_value().unwrap() - brute_force(2)).abs() < 1e-6);
}
