//! TOML configuration for a planning run.
//!
//! Every field is optional; a missing file section falls back to defaults and
//! command-line flags are applied on top by the binary.
//!
//! ```toml
//! budget = 3
//! strategy = "exact-share"
//! timeout = 120.0
//!
//! [solver]
//! backend = "share-bnb"
//! max_nodes = 500000
//!
//! [data]
//! directory = "data"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::application::planner::PlannerConfig;
use crate::infrastructure::loader::DataFiles;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub planner: PlannerConfig,
    pub data: DataFiles,
    /// Wall-clock seconds for the whole solve, enforced outside the solver
    pub timeout: Option<f64>,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.timeout_duration()?;
        Ok(config)
    }

    pub fn timeout_duration(&self) -> Result<Option<Duration>, ConfigError> {
        self.timeout
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|_| {
                    ConfigError::Invalid(format!(
                        "timeout must be a non-negative number, got {secs}"
                    ))
                })
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        site_model::DEFAULT_BUDGET,
        value_objects::{SolverBackend, StrategyKind},
    };
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.planner.budget, DEFAULT_BUDGET);
        assert_eq!(config.planner.strategy, StrategyKind::LinearProxy);
        assert_eq!(config.planner.solver.backend, SolverBackend::Auto);
        assert_eq!(config.data, DataFiles::default());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = AppConfig::from_toml_str(
            r#"
            budget = 3
            strategy = "exact-share"
            timeout = 1.5

            [solver]
            backend = "share-bnb"
            max_nodes = 1000
            verbose = true

            [data]
            directory = "/srv/retail"
            distance = "distances.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.planner.budget, 3);
        assert_eq!(config.planner.strategy, StrategyKind::ExactShare);
        assert_eq!(
            config.planner.solver.backend,
            SolverBackend::ShareBranchAndBound
        );
        assert_eq!(config.planner.solver.max_nodes, Some(1000));
        assert!(config.planner.solver.verbose);
        assert_eq!(config.data.directory, PathBuf::from("/srv/retail"));
        assert_eq!(config.data.distance, "distances.csv");
        assert_eq!(config.data.demand, "RetailStores-h_is.csv");
        assert_eq!(
            config.timeout_duration().unwrap(),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn test_rejects_unknown_strategy_and_negative_timeout() {
        assert!(matches!(
            AppConfig::from_toml_str("strategy = \"quadratic\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("timeout = -1.0"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "budget = 2").unwrap();
        writeln!(file, "[solver]").unwrap();
        writeln!(file, "backend = \"glpk\"").unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.planner.budget, 2);
        assert_eq!(config.planner.solver.backend, SolverBackend::Glpk);

        let missing = AppConfig::from_file(Path::new("/nonexistent/storeopt.toml"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
