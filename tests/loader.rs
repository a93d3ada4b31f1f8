//! CSV input through to a decision

use std::fs;
use std::path::Path;
use storeopt::{
    infrastructure::LoadError, AppConfig, CsvLoader, DataFiles, DataIntegrityError, Error,
    PlannerConfig, SitePlanner, StrategyKind,
};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

/// The single-location scenario laid out like the workbook export
fn workbook(dir: &Path) {
    write(dir, "RetailStores-Set I.csv", "Demand points\nA\n");
    write(dir, "RetailStores-Set J.csv", "Candidate sites\nP1\nP2\n");
    write(dir, "RetailStores-Set M.csv", "Stores\nP1\nP2\n");
    write(dir, "RetailStores-Set S.csv", "Segments\ns1\n");
    write(dir, "RetailStores-h_is.csv", "i,s,h\nA,s1,100\n");
    write(dir, "RetailStores-d_ij.csv", "i,j,d\nA,P1,2\nA,P2,4\n");
    write(dir, "RetailStores-V_j=0.csv", "V_j=0\ni,value\nA,0\n");
}

#[test]
fn test_exact_share_from_csv() {
    let dir = TempDir::new().unwrap();
    workbook(dir.path());

    let data = CsvLoader::new(DataFiles::in_directory(dir.path()))
        .load()
        .unwrap();
    let report = SitePlanner::new(PlannerConfig {
        budget: 1,
        strategy: StrategyKind::ExactShare,
        ..PlannerConfig::default()
    })
    .plan(data)
    .unwrap();

    assert_eq!(report.opened(), &["P1".to_string()]);
    assert!((report.objective_value().unwrap() - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_config_file_points_at_renamed_tables() {
    let dir = TempDir::new().unwrap();
    workbook(dir.path());
    fs::rename(
        dir.path().join("RetailStores-d_ij.csv"),
        dir.path().join("distances.csv"),
    )
    .unwrap();

    let toml = format!(
        "budget = 2\n\
         strategy = \"exact-share\"\n\
         [data]\n\
         directory = {:?}\n\
         distance = \"distances.csv\"\n",
        dir.path().display().to_string()
    );
    let config = AppConfig::from_toml_str(&toml).unwrap();

    let data = CsvLoader::new(config.data.clone()).load().unwrap();
    let report = SitePlanner::new(config.planner).plan(data).unwrap();
    assert_eq!(report.opened(), &["P1".to_string(), "P2".to_string()]);
}

#[test]
fn test_candidate_without_potential_store_is_rejected() {
    let dir = TempDir::new().unwrap();
    workbook(dir.path());
    write(dir.path(), "RetailStores-Set M.csv", "Stores\nP1\nC7\n");
    write(
        dir.path(),
        "RetailStores-d_ij.csv",
        "i,j,d\nA,P1,2\nA,C7,1\n",
    );

    let data = CsvLoader::new(DataFiles::in_directory(dir.path()))
        .load()
        .unwrap();
    let err = SitePlanner::new(PlannerConfig {
        strategy: StrategyKind::ExactShare,
        ..PlannerConfig::default()
    })
    .plan(data)
    .unwrap_err();

    match err {
        Error::DataIntegrity(inner @ DataIntegrityError::CandidateMismatch { .. }) => {
            assert_eq!(inner.invariant(), "potential-equals-candidates");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_unknown_identifier_in_table() {
    let dir = TempDir::new().unwrap();
    workbook(dir.path());
    write(dir.path(), "RetailStores-h_is.csv", "i,s,h\nZ,s1,5\n");

    let data = CsvLoader::new(DataFiles::in_directory(dir.path()))
        .load()
        .unwrap();
    let err = SitePlanner::new(PlannerConfig {
        strategy: StrategyKind::ExactShare,
        ..PlannerConfig::default()
    })
    .plan(data)
    .unwrap_err();

    assert!(err.to_string().contains("table-keys-in-domain"), "{err}");
}

#[test]
fn test_unclassified_store_fails_at_load() {
    let dir = TempDir::new().unwrap();
    workbook(dir.path());
    write(dir.path(), "RetailStores-Set M.csv", "Stores\nP1\nP2\nWH1\n");

    let err = CsvLoader::new(DataFiles::in_directory(dir.path()))
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        LoadError::Integrity(DataIntegrityError::UnclassifiedStore { .. })
    ));
}
