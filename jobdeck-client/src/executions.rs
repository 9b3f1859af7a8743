//! Execution and test result endpoints

use crate::CiClient;
use crate::error::Result;
use jobdeck_core::domain::execution::Execution;
use jobdeck_core::domain::result::JobResult;
use reqwest::Method;
use serde_json::Value;
use tracing::warn;

impl CiClient {
    /// List the most recent executions the engine recorded
    ///
    /// Rows are decoded one at a time; a row that does not decode is
    /// logged and skipped instead of failing the whole listing.
    ///
    /// # Returns
    /// Executions, newest first
    pub async fn recent_executions(&self) -> Result<Vec<Execution>> {
        let url = self.endpoint(&["api", "executions", "recent"])?;
        let rows: Vec<Value> = self.call(Method::GET, url, None::<&()>).await?;

        let total = rows.len();
        let executions: Vec<Execution> = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value(row) {
                Ok(execution) => Some(execution),
                Err(e) => {
                    warn!("Skipping undecodable execution row: {}", e);
                    None
                }
            })
            .collect();

        if executions.len() < total {
            warn!(
                "Kept {} of {} recent execution row(s)",
                executions.len(),
                total
            );
        }
        Ok(executions)
    }

    /// Fetch the test results of one build
    ///
    /// The result is returned as decoded, including `success: false`
    /// bodies; deciding what those mean is up to the caller.
    ///
    /// # Arguments
    /// * `job_type` - The job name
    /// * `build_number` - The engine-assigned build (or queue) number
    pub async fn job_results(&self, job_type: &str, build_number: &str) -> Result<JobResult> {
        let url = self.endpoint(&["api", "jenkins", "job-results", job_type, build_number])?;
        self.call(Method::GET, url, None::<&()>).await
    }
}
