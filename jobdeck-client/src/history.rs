//! Job history endpoint

use crate::CiClient;
use crate::error::Result;
use jobdeck_core::domain::history::JobHistorySummary;
use reqwest::Method;

impl CiClient {
    /// Fetch aggregated statistics for a job over the last `days` days
    ///
    /// # Arguments
    /// * `job_name` - The job name
    /// * `days` - Size of the trailing window
    ///
    /// # Returns
    /// The engine's summary, passed through as computed
    pub async fn job_history(&self, job_name: &str, days: u32) -> Result<JobHistorySummary> {
        let mut url = self.endpoint(&["api", "job-history"])?;
        url.query_pairs_mut()
            .append_pair("jobId", job_name)
            .append_pair("days", &days.to_string());

        self.call_enveloped(Method::GET, url, None::<&()>).await
    }
}
