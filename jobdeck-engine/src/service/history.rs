//! History aggregation
//!
//! The engine computes run counts, success rate and average duration; the
//! summary is passed through as received. A `success: false` response is
//! an error, while zero runs is a valid empty history.

use jobdeck_client::CiGateway;
use jobdeck_core::domain::history::{ExecutionSummary, JobHistorySummary};
use jobdeck_core::domain::result::JobResult;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Error, Result};

pub struct HistoryService {
    gateway: Arc<dyn CiGateway>,
}

impl HistoryService {
    pub fn new(gateway: Arc<dyn CiGateway>) -> Self {
        Self { gateway }
    }

    /// Summary statistics for `job_name` over the last `window_days` days
    pub async fn history(&self, job_name: &str, window_days: u32) -> Result<JobHistorySummary> {
        if window_days == 0 {
            return Err(Error::Validation(
                "history window must be at least one day".to_string(),
            ));
        }

        let mut summary = self.gateway.job_history(job_name, window_days).await?;
        debug!(
            "History for {} over {} day(s): {} run(s)",
            job_name, window_days, summary.total_runs
        );

        if summary.is_empty() {
            // The ratios are undefined without runs, whatever the engine sent.
            summary.success_rate = None;
            summary.avg_execution_time_seconds = None;
        }

        if let Some(rate) = summary
            .success_rate
            .filter(|rate| !(0.0..=100.0).contains(rate))
        {
            warn!("Engine reported success rate {} for {}", rate, job_name);
        }
        if let Some(avg) = summary.avg_execution_time_seconds.filter(|avg| *avg < 0.0) {
            warn!("Engine reported negative average duration {} for {}", avg, job_name);
        }

        for execution in &mut summary.executions {
            if execution.job_name.is_empty() {
                execution.job_name = job_name.to_string();
            }
        }

        Ok(summary)
    }

    /// Fetches the test results behind one row of a history summary
    pub async fn results_for(&self, execution: &ExecutionSummary) -> Result<JobResult> {
        let result = self
            .gateway
            .job_results(&execution.job_name, &execution.build_number)
            .await?;

        if !result.success {
            return Err(Error::Application(result.failure_message()));
        }
        Ok(result)
    }
}
