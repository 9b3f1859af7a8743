//! Scripted in-memory gateway for engine tests

use async_trait::async_trait;
use jobdeck_client::{CiGateway, ClientError, Result};
use jobdeck_core::domain::cluster::Cluster;
use jobdeck_core::domain::execution::Execution;
use jobdeck_core::domain::history::JobHistorySummary;
use jobdeck_core::domain::job::{JobDefinition, Parameters};
use jobdeck_core::domain::result::{JobResult, JobResultData, TestCase, TestStatus};
use jobdeck_core::dto::trigger::{TriggerAck, TriggerRequest};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Gateway whose replies are queued up front
///
/// Empty queues fall back to: incrementing queue numbers for triggers, an
/// in-progress result for result fetches, and an empty history.
#[derive(Default)]
pub struct FakeGateway {
    pub jobs: Mutex<Vec<JobDefinition>>,
    pub clusters: Mutex<Vec<Cluster>>,
    pub recent: Mutex<Vec<Execution>>,
    pub trigger_replies: Mutex<VecDeque<Result<TriggerAck>>>,
    pub result_replies: Mutex<VecDeque<Result<JobResult>>>,
    pub history_replies: Mutex<VecDeque<Result<JobHistorySummary>>>,
    /// How long each result fetch takes
    pub result_delay: Mutex<Duration>,
    pub triggered: Mutex<Vec<TriggerRequest>>,
    pub fetches: Mutex<Vec<(String, String, Instant)>>,
    pub catalog_calls: AtomicUsize,
    next_queue: AtomicU64,
}

impl FakeGateway {
    pub fn with_platform_jobs() -> Self {
        let gateway = Self::default();
        *gateway.jobs.lock().unwrap() = vec![
            JobDefinition::new("Platform", params(&[("source", ""), ("target", "")])),
            JobDefinition::new("Configdiff", params(&[("cluster", "lab"), ("suite", "full")])),
        ];
        *gateway.clusters.lock().unwrap() = vec![
            Cluster {
                name: "clusterA".to_string(),
                release_version: "4.2.0".to_string(),
            },
            Cluster {
                name: "clusterB".to_string(),
                release_version: "4.3.1".to_string(),
            },
        ];
        gateway
    }

    pub fn push_trigger(&self, reply: Result<TriggerAck>) {
        self.trigger_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_result(&self, reply: Result<JobResult>) {
        self.result_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_history(&self, reply: Result<JobHistorySummary>) {
        self.history_replies.lock().unwrap().push_back(reply);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    pub fn fetch_times(&self) -> Vec<Instant> {
        self.fetches.lock().unwrap().iter().map(|(_, _, at)| *at).collect()
    }
}

#[async_trait]
impl CiGateway for FakeGateway {
    async fn list_jobs(&self) -> Result<Vec<JobDefinition>> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.jobs.lock().unwrap().clone())
    }

    async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        Ok(self.clusters.lock().unwrap().clone())
    }

    async fn recent_executions(&self) -> Result<Vec<Execution>> {
        Ok(self.recent.lock().unwrap().clone())
    }

    async fn trigger(&self, req: &TriggerRequest) -> Result<TriggerAck> {
        self.triggered.lock().unwrap().push(req.clone());
        let scripted = self.trigger_replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| {
            let n = self.next_queue.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TriggerAck {
                queue_number: n.to_string(),
            })
        })
    }

    async fn job_results(&self, job_type: &str, build_number: &str) -> Result<JobResult> {
        self.fetches.lock().unwrap().push((
            job_type.to_string(),
            build_number.to_string(),
            Instant::now(),
        ));

        let delay = *self.result_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.result_replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(running()))
    }

    async fn job_history(&self, _job_name: &str, _days: u32) -> Result<JobHistorySummary> {
        let scripted = self.history_replies.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(JobHistorySummary::empty()))
    }
}

pub fn params(pairs: &[(&str, &str)]) -> Parameters {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn running() -> JobResult {
    JobResult {
        success: true,
        message: None,
        data: JobResultData {
            status: "IN_PROGRESS".to_string(),
            test_cases: Vec::new(),
        },
    }
}

pub fn finished(statuses: &[TestStatus]) -> JobResult {
    JobResult {
        success: true,
        message: None,
        data: JobResultData {
            status: String::new(),
            test_cases: statuses
                .iter()
                .enumerate()
                .map(|(i, status)| TestCase {
                    name: format!("test_{i}"),
                    status: *status,
                    duration_seconds: 1.0,
                    error_details: None,
                    error_stack_trace: None,
                })
                .collect(),
        },
    }
}

pub fn rejected(message: &str) -> JobResult {
    JobResult {
        success: false,
        message: Some(message.to_string()),
        data: JobResultData::default(),
    }
}

pub fn unreachable() -> ClientError {
    ClientError::api_error(503, "Service Unavailable")
}
