// Domain module: Business logic and models

pub mod error;
pub mod models;
pub mod objective;
pub mod site_data;
pub mod site_model;
pub mod solver_service;
pub mod value_objects;

pub use error::*;
pub use models::*;
pub use objective::*;
pub use site_data::*;
pub use site_model::*;
pub use solver_service::{SolverError, SolverService};
pub use value_objects::*;
