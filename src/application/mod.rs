pub mod planner;
pub mod report;

pub use planner::{BuiltModel, PlannerConfig, SitePlanner};
pub use report::{DecisionReport, PipelineStage, OPEN_THRESHOLD};
