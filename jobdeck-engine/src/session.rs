//! Session context
//!
//! One [`Session`] per client process. It owns the catalog, the execution
//! tracker and the registry of active result watches, and is the only
//! entry point presentation code needs. Dropping it cancels every watch.

use jobdeck_client::{CiClient, CiGateway};
use jobdeck_core::domain::execution::{Execution, ExecutionId};
use jobdeck_core::domain::history::{ExecutionSummary, JobHistorySummary};
use jobdeck_core::domain::job::Parameters;
use jobdeck_core::domain::result::{JobResult, TestCase};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::scheduler::{PollUpdate, ResultPoller, WatchHandle};
use crate::service::{Catalog, ExecutionTracker, HistoryService, TriggerService};

/// Outcome of a session-level watch, delivered once
#[derive(Debug)]
pub enum WatchEvent {
    /// The execution reached a terminal status
    Finished {
        execution: Execution,
        test_cases: Vec<TestCase>,
    },
    /// This watch cycle failed; the execution itself is unchanged
    Failed {
        execution_id: ExecutionId,
        error: Error,
    },
}

struct ActiveWatch {
    generation: u64,
    _handle: WatchHandle,
}

type Registry = Arc<Mutex<HashMap<ExecutionId, ActiveWatch>>>;

pub struct Session {
    config: Config,
    catalog: Arc<Catalog>,
    tracker: Arc<ExecutionTracker>,
    trigger: TriggerService,
    history: HistoryService,
    poller: ResultPoller,
    watches: Registry,
    generation: AtomicU64,
}

impl Session {
    /// Creates a session talking to the engine at `config.api_url`
    pub fn connect(config: Config) -> Result<Self> {
        let client = CiClient::with_timeout(config.api_url.clone(), config.request_timeout)?;
        Ok(Self::new(config, Arc::new(client)))
    }

    /// Creates an empty session over any gateway
    pub fn new(config: Config, gateway: Arc<dyn CiGateway>) -> Self {
        let catalog = Arc::new(Catalog::new(Arc::clone(&gateway)));
        let tracker = Arc::new(ExecutionTracker::new(Arc::clone(&gateway)));
        let trigger = TriggerService::new(
            Arc::clone(&gateway),
            Arc::clone(&catalog),
            Arc::clone(&tracker),
        );
        let history = HistoryService::new(Arc::clone(&gateway));
        let poller = ResultPoller::new(gateway, config.poll_interval);

        Self {
            config,
            catalog,
            tracker,
            trigger,
            history,
            poller,
            watches: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tracker(&self) -> &ExecutionTracker {
        &self.tracker
    }

    /// Poller for builds that are not tracked by this session
    pub fn poller(&self) -> &ResultPoller {
        &self.poller
    }

    // =============================================================================
    // Catalog and executions
    // =============================================================================

    pub async fn refresh_catalog(&self) -> Result<()> {
        self.catalog.refresh().await
    }

    pub async fn list_recent(&self) -> Result<Vec<Execution>> {
        self.tracker.list_recent().await
    }

    /// Triggers a job with a complete parameter map, loading the catalog first if needed
    pub async fn trigger(&self, job_name: &str, parameters: Parameters) -> Result<Execution> {
        self.catalog.ensure_loaded().await?;
        self.trigger.trigger(job_name, parameters).await
    }

    /// Triggers a job, filling parameters not in `overrides` with catalog defaults
    pub async fn trigger_with_defaults(
        &self,
        job_name: &str,
        overrides: &Parameters,
    ) -> Result<Execution> {
        self.catalog.ensure_loaded().await?;
        self.trigger.trigger_with_defaults(job_name, overrides).await
    }

    /// Re-triggers a tracked execution as a new execution
    pub async fn restart(&self, id: ExecutionId) -> Result<Execution> {
        let original = self.tracker.get(id)?;
        self.catalog.ensure_loaded().await?;
        self.trigger.restart(&original).await
    }

    /// Fetches a build's results once
    ///
    /// Finished results are applied to the matching tracked execution.
    pub async fn check_results(&self, job_name: &str, build_number: &str) -> Result<JobResult> {
        let result = self.poller.check_once(job_name, build_number).await?;

        if !result.is_finished() {
            return Ok(result);
        }
        if let Some(execution) = self.tracker.by_build_number(job_name, build_number) {
            self.tracker.record_outcome(execution.id, &result)?;
        }
        Ok(result)
    }

    // =============================================================================
    // History
    // =============================================================================

    pub async fn history(&self, job_name: &str, window_days: u32) -> Result<JobHistorySummary> {
        self.history.history(job_name, window_days).await
    }

    pub async fn results_for(&self, execution: &ExecutionSummary) -> Result<JobResult> {
        self.history.results_for(execution).await
    }

    // =============================================================================
    // Watches
    // =============================================================================

    /// Polls a tracked execution's results until they are final
    ///
    /// Watching an execution that is already watched replaces the earlier
    /// watch, which is cancelled and never reports. `on_event` is called
    /// once, from the polling task, after the tracker has been updated.
    /// It must not block.
    pub fn watch<F>(&self, id: ExecutionId, on_event: F) -> Result<()>
    where
        F: FnOnce(WatchEvent) + Send + 'static,
    {
        let execution = self.tracker.get(id)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst);
        let tracker = Arc::clone(&self.tracker);
        let registry = Arc::clone(&self.watches);

        // Held until the new handle is stored, so a fast first fetch cannot
        // finish before its registration.
        let mut watches = self.watches.lock().unwrap_or_else(PoisonError::into_inner);

        let handle = self.poller.watch(
            execution.job_name.clone(),
            execution.build_number.clone(),
            move |update| {
                let event = match update {
                    PollUpdate::Finished { result, .. } => {
                        match tracker.record_outcome(id, &result) {
                            Ok(execution) => WatchEvent::Finished {
                                execution,
                                test_cases: result.data.test_cases,
                            },
                            Err(error) => WatchEvent::Failed {
                                execution_id: id,
                                error,
                            },
                        }
                    }
                    PollUpdate::Failed(error) => WatchEvent::Failed {
                        execution_id: id,
                        error,
                    },
                };

                let ended = {
                    let mut watches = registry.lock().unwrap_or_else(PoisonError::into_inner);
                    match watches.get(&id) {
                        Some(active) if active.generation == generation => watches.remove(&id),
                        _ => None,
                    }
                };
                drop(ended);

                on_event(event);
            },
        );

        let replaced = watches.insert(
            id,
            ActiveWatch {
                generation,
                _handle: handle,
            },
        );
        drop(watches);

        if replaced.is_some() {
            debug!("Replaced the existing watch of execution {}", id);
        }
        Ok(())
    }

    /// Cancels the watch of an execution
    ///
    /// # Returns
    /// Whether a watch was active
    pub fn unwatch(&self, id: ExecutionId) -> bool {
        let removed = self
            .watches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        removed.is_some()
    }

    /// Executions currently being watched
    pub fn active_watches(&self) -> Vec<ExecutionId> {
        let mut ids: Vec<_> = self
            .watches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        ids.sort();
        ids
    }

    /// Cancels every active watch
    pub fn shutdown(&self) {
        let drained: Vec<_> = self
            .watches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();

        if !drained.is_empty() {
            info!("Cancelling {} active watch(es)", drained.len());
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}
