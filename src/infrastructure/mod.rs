pub mod config;
pub mod loader;
pub mod runtime;

pub use config::{AppConfig, ConfigError};
pub use loader::{CsvLoader, DataFiles, LoadError};
pub use runtime::solve_with_timeout;
