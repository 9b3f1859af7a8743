//! Job catalog and trigger endpoints

use crate::CiClient;
use crate::error::Result;
use jobdeck_core::domain::cluster::Cluster;
use jobdeck_core::domain::job::JobDefinition;
use jobdeck_core::dto::trigger::{TriggerAck, TriggerRequest};
use reqwest::Method;
use tracing::info;

impl CiClient {
    // =============================================================================
    // Catalog
    // =============================================================================

    /// List all triggerable jobs with their default parameters
    ///
    /// # Returns
    /// The job definitions known to the engine
    pub async fn list_jobs(&self) -> Result<Vec<JobDefinition>> {
        let url = self.endpoint(&["api", "jobs"])?;
        self.call(Method::GET, url, None::<&()>).await
    }

    /// List all clusters that cluster-valued parameters may name
    ///
    /// # Returns
    /// The clusters known to the engine
    pub async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        let url = self.endpoint(&["api", "clusters"])?;
        self.call(Method::GET, url, None::<&()>).await
    }

    // =============================================================================
    // Trigger
    // =============================================================================

    /// Queue a parameterized run of a job
    ///
    /// # Arguments
    /// * `req` - Job type and the full parameter set
    ///
    /// # Returns
    /// The queue number the engine assigned
    ///
    /// # Example
    /// ```no_run
    /// # use jobdeck_client::CiClient;
    /// # use jobdeck_core::dto::trigger::TriggerRequest;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = CiClient::new("http://localhost:5000");
    /// let ack = client.trigger(&TriggerRequest {
    ///     job_type: "Platform".to_string(),
    ///     parameters: Default::default(),
    /// }).await?;
    /// println!("queued as #{}", ack.queue_number);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn trigger(&self, req: &TriggerRequest) -> Result<TriggerAck> {
        let url = self.endpoint(&["api", "jenkins", "trigger"])?;
        let ack: TriggerAck = self.call_enveloped(Method::POST, url, Some(req)).await?;

        info!("Triggered {} as queue item {}", req.job_type, ack.queue_number);
        Ok(ack)
    }
}
