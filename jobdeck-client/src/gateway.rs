//! Gateway trait
//!
//! The seam between the orchestration engine and the network. The engine
//! only talks to the CI engine through this trait, so tests can script
//! responses without a server.

use async_trait::async_trait;
use jobdeck_core::domain::cluster::Cluster;
use jobdeck_core::domain::execution::Execution;
use jobdeck_core::domain::history::JobHistorySummary;
use jobdeck_core::domain::job::JobDefinition;
use jobdeck_core::domain::result::JobResult;
use jobdeck_core::dto::trigger::{TriggerAck, TriggerRequest};

use crate::CiClient;
use crate::error::Result;

/// Operations the orchestration engine needs from the CI engine
#[async_trait]
pub trait CiGateway: Send + Sync {
    /// Lists job definitions
    async fn list_jobs(&self) -> Result<Vec<JobDefinition>>;

    /// Lists clusters
    async fn list_clusters(&self) -> Result<Vec<Cluster>>;

    /// Lists recent executions, newest first
    async fn recent_executions(&self) -> Result<Vec<Execution>>;

    /// Queues a job run
    ///
    /// A `success: false` reply is reported as
    /// [`ClientError::Application`](crate::ClientError::Application).
    async fn trigger(&self, req: &TriggerRequest) -> Result<TriggerAck>;

    /// Fetches the raw test results of a build
    async fn job_results(&self, job_type: &str, build_number: &str) -> Result<JobResult>;

    /// Fetches a job's history summary
    async fn job_history(&self, job_name: &str, days: u32) -> Result<JobHistorySummary>;
}

#[async_trait]
impl CiGateway for CiClient {
    async fn list_jobs(&self) -> Result<Vec<JobDefinition>> {
        CiClient::list_jobs(self).await
    }

    async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        CiClient::list_clusters(self).await
    }

    async fn recent_executions(&self) -> Result<Vec<Execution>> {
        CiClient::recent_executions(self).await
    }

    async fn trigger(&self, req: &TriggerRequest) -> Result<TriggerAck> {
        CiClient::trigger(self, req).await
    }

    async fn job_results(&self, job_type: &str, build_number: &str) -> Result<JobResult> {
        CiClient::job_results(self, job_type, build_number).await
    }

    async fn job_history(&self, job_name: &str, days: u32) -> Result<JobHistorySummary> {
        CiClient::job_history(self, job_name, days).await
    }
}
