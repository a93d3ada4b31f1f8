// Runs the blocking pipeline off the async runtime with a wall-clock limit

use std::time::Duration;
use tracing::warn;

use crate::application::{planner::SitePlanner, report::DecisionReport};
use crate::domain::{error::Result, site_data::SiteData, value_objects::OutcomeStatus};

/// Plan on a blocking thread, giving up after `timeout`.
///
/// An expired timeout yields an Inconclusive report rather than an error. The
/// solver thread cannot be interrupted and is left to finish in the
/// background; its result is discarded.
pub async fn solve_with_timeout(
    planner: SitePlanner,
    data: SiteData,
    timeout: Option<Duration>,
) -> Result<DecisionReport> {
    run_with_timeout(move || planner.plan(data), timeout).await
}

pub(crate) async fn run_with_timeout<F>(job: F, timeout: Option<Duration>) -> Result<DecisionReport>
where
    F: FnOnce() -> Result<DecisionReport> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(job);

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, handle).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(timeout_secs = limit.as_secs_f64(), "solve timed out");
                return Ok(inconclusive(
                    "timeout",
                    format!("no answer within {:.3}s", limit.as_secs_f64()),
                ));
            }
        },
        None => handle.await,
    };

    match joined {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "solver task did not complete");
            Ok(inconclusive("aborted", e.to_string()))
        }
    }
}

fn inconclusive(termination: &str, message: String) -> DecisionReport {
    DecisionReport::Inconclusive {
        status: OutcomeStatus::SolverError.to_string(),
        termination: termination.to_string(),
        message,
    }
}
