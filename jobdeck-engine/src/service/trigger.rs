//! Trigger and restart orchestration
//!
//! Validates a job selection locally, asks the engine to queue it, and
//! registers the resulting execution with the tracker. Not idempotent:
//! every successful call creates a new execution.

use chrono::Utc;
use jobdeck_client::CiGateway;
use jobdeck_core::domain::execution::Execution;
use jobdeck_core::domain::job::{JobDefinition, Parameters};
use jobdeck_core::dto::trigger::TriggerRequest;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::service::{Catalog, ExecutionTracker};

pub struct TriggerService {
    gateway: Arc<dyn CiGateway>,
    catalog: Arc<Catalog>,
    tracker: Arc<ExecutionTracker>,
}

impl TriggerService {
    pub fn new(
        gateway: Arc<dyn CiGateway>,
        catalog: Arc<Catalog>,
        tracker: Arc<ExecutionTracker>,
    ) -> Self {
        Self {
            gateway,
            catalog,
            tracker,
        }
    }

    /// Triggers `job_name` with a complete parameter map
    ///
    /// The job must be in the catalog and `parameters` must supply every
    /// key it declares; otherwise a validation error is returned and no
    /// request is sent.
    ///
    /// # Returns
    /// The new execution, registered and in `QUEUED` state
    pub async fn trigger(&self, job_name: &str, parameters: Parameters) -> Result<Execution> {
        let job = self.known_job(job_name)?;

        let missing = job.missing_keys(&parameters);
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "job {} is missing parameter(s): {}",
                job_name,
                missing.join(", ")
            )));
        }

        let undeclared = job.undeclared_keys(&parameters);
        if !undeclared.is_empty() {
            warn!(
                "Passing parameter(s) {} not declared by job {}",
                undeclared.join(", "),
                job_name
            );
        }

        let request = TriggerRequest {
            job_type: job.name.clone(),
            parameters,
        };
        let ack = self.gateway.trigger(&request).await?;

        let execution = Execution::queued(
            self.tracker.next_id(),
            request.job_type,
            ack.queue_number,
            request.parameters,
            Utc::now(),
        );
        self.tracker.register(execution.clone())?;

        info!(
            "Execution {} queued for {} as #{}",
            execution.id, execution.job_name, execution.build_number
        );
        Ok(execution)
    }

    /// Triggers `job_name` with catalog defaults for every key not in `overrides`
    ///
    /// Override keys the job does not declare are rejected.
    pub async fn trigger_with_defaults(
        &self,
        job_name: &str,
        overrides: &Parameters,
    ) -> Result<Execution> {
        let job = self.known_job(job_name)?;

        let undeclared = job.undeclared_keys(overrides);
        if !undeclared.is_empty() {
            return Err(Error::Validation(format!(
                "job {} has no parameter(s): {}",
                job_name,
                undeclared.join(", ")
            )));
        }

        self.trigger(job_name, job.fill(overrides)).await
    }

    /// Runs an execution's job again with the same parameters
    ///
    /// Always creates a new execution; the original is left untouched.
    pub async fn restart(&self, execution: &Execution) -> Result<Execution> {
        info!(
            "Restarting execution {} ({} #{})",
            execution.id, execution.job_name, execution.build_number
        );
        self.trigger(&execution.job_name, execution.parameters.clone())
            .await
    }

    fn known_job(&self, job_name: &str) -> Result<JobDefinition> {
        self.catalog.job(job_name).map_err(|_| {
            Error::Validation(format!("unknown job {:?}", job_name))
        })
    }
}
