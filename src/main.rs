use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use storeopt::{
    solve_with_timeout, AppConfig, CsvLoader, DecisionReport, SitePlanner, SolverBackend,
    StrategyKind,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Choose which candidate sites to open as new retail stores
#[derive(Debug, Parser)]
#[command(name = "storeopt", version, about)]
struct Cli {
    /// Directory holding the CSV input tables
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// TOML configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of new stores
    #[arg(long)]
    budget: Option<usize>,

    /// Objective formulation: linear-proxy or exact-share
    #[arg(long)]
    strategy: Option<StrategyKind>,

    /// Solver backend: auto, highs, coin-cbc, glpk or share-bnb
    #[arg(long)]
    backend: Option<SolverBackend>,

    /// Path to the glpsol executable
    #[arg(long)]
    glpsol: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(AppConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(dir) = self.data_dir {
            config.data.directory = dir;
        }
        if let Some(budget) = self.budget {
            config.planner.budget = budget;
        }
        if let Some(strategy) = self.strategy {
            config.planner.strategy = strategy;
        }
        if let Some(backend) = self.backend {
            config.planner.solver.backend = backend;
        }
        if let Some(glpsol) = self.glpsol {
            config.planner.solver.glpsol_path = Some(glpsol);
        }
        if let Some(timeout) = self.timeout {
            config.timeout = Some(timeout);
        }
        Ok((config, self.json))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, json) = Cli::parse().into_config()?;
    let timeout = config.timeout_duration()?;

    let data = CsvLoader::new(config.data.clone())
        .load()
        .with_context(|| format!("loading data from {}", config.data.directory.display()))?;
    info!(
        locations = data.demand_locations.len(),
        candidates = data.candidate_sites.len(),
        "input loaded"
    );

    let planner = SitePlanner::new(config.planner);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .context("starting async runtime")?;
    let result = runtime.block_on(solve_with_timeout(planner, data, timeout));
    // A timed-out solve keeps its blocking thread; don't wait for it
    runtime.shutdown_timeout(Duration::from_millis(100));

    let report = result?;
    print_report(&report, json)?;
    Ok(())
}

fn print_report(report: &DecisionReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
