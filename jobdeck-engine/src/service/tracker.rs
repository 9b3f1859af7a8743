//! Execution tracker
//!
//! Owns the session's working set of executions: the ones the engine
//! lists as recent plus the ones triggered locally. Records are never
//! removed. Reads return snapshots, so rendering never observes a
//! half-applied update.

use chrono::{DateTime, Utc};
use jobdeck_client::CiGateway;
use jobdeck_core::domain::execution::{Execution, ExecutionId};
use jobdeck_core::domain::result::{JobResult, TestCase};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::error::{Error, Result};

#[derive(Default)]
struct TrackerState {
    /// Newest first
    executions: Vec<Execution>,
    test_cases: HashMap<ExecutionId, Vec<TestCase>>,
}

impl TrackerState {
    fn position(&self, id: ExecutionId) -> Option<usize> {
        self.executions.iter().position(|e| e.id == id)
    }

    fn sort(&mut self) {
        self.executions
            .sort_by(|a, b| b.start_time.cmp(&a.start_time));
    }
}

pub struct ExecutionTracker {
    gateway: Arc<dyn CiGateway>,
    state: RwLock<TrackerState>,
    last_id: AtomicI64,
}

impl ExecutionTracker {
    pub fn new(gateway: Arc<dyn CiGateway>) -> Self {
        Self {
            gateway,
            state: RwLock::new(TrackerState::default()),
            last_id: AtomicI64::new(0),
        }
    }

    /// Allocates a fresh execution id
    ///
    /// Ids are the current Unix time in milliseconds, bumped as needed so
    /// they strictly increase within the process.
    pub fn next_id(&self) -> ExecutionId {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        ExecutionId(now.max(previous + 1))
    }

    /// Fetches the engine's recent executions and merges them into the working set
    ///
    /// A remote record updates the local one with the same id, or the
    /// same job and build number. A local terminal outcome is kept over a
    /// remote copy that has not caught up yet. Remote end times are
    /// normalized: a terminal record missing one gets the known end time,
    /// or the listing time, and a non-terminal record never keeps one.
    ///
    /// # Returns
    /// A snapshot of the whole working set, newest first
    pub async fn list_recent(&self) -> Result<Vec<Execution>> {
        let remote = self.gateway.recent_executions().await?;
        debug!("Engine listed {} recent execution(s)", remote.len());

        let listed_at = Utc::now();
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        for incoming in remote {
            let existing = state.executions.iter().position(|e| {
                e.id == incoming.id
                    || (!incoming.build_number.is_empty()
                        && e.is_build(&incoming.job_name, &incoming.build_number))
            });

            match existing {
                Some(index) => {
                    let merged = merge(&state.executions[index], incoming, listed_at);
                    state.executions[index] = merged;
                }
                None => state.executions.push(settle(incoming, None, listed_at)),
            }
        }
        state.sort();

        Ok(state.executions.clone())
    }

    /// Snapshot of the working set, newest first
    pub fn snapshot(&self) -> Vec<Execution> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .executions
            .clone()
    }

    /// Adds a locally created execution
    ///
    /// The record becomes visible before the engine's listing reflects it.
    pub fn register(&self, execution: Execution) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.position(execution.id).is_some() {
            return Err(Error::Validation(format!(
                "execution {} is already registered",
                execution.id
            )));
        }

        debug!(
            "Registered execution {} ({} #{})",
            execution.id, execution.job_name, execution.build_number
        );
        state.executions.push(execution);
        state.sort();
        Ok(())
    }

    pub fn get(&self, id: ExecutionId) -> Result<Execution> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .position(id)
            .map(|index| state.executions[index].clone())
            .ok_or_else(|| Error::NotFound(format!("execution {}", id)))
    }

    /// Finds the execution for build `build_number` of `job_name`
    pub fn by_build_number(&self, job_name: &str, build_number: &str) -> Option<Execution> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .executions
            .iter()
            .find(|e| e.is_build(job_name, build_number))
            .cloned()
    }

    /// Applies a finished result to an execution
    ///
    /// Sets the terminal status and end time and stores the test cases.
    /// An execution that is already terminal is returned unchanged.
    pub fn record_outcome(&self, id: ExecutionId, result: &JobResult) -> Result<Execution> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let index = state
            .position(id)
            .ok_or_else(|| Error::NotFound(format!("execution {}", id)))?;

        if state.executions[index].is_terminal() {
            debug!("Execution {} is already terminal, keeping it", id);
            return Ok(state.executions[index].clone());
        }

        let status = result.outcome();
        let execution = &mut state.executions[index];
        execution.status = status;
        execution.end_time = Some(Utc::now());
        let updated = execution.clone();

        state
            .test_cases
            .insert(id, result.data.test_cases.clone());

        info!(
            "Execution {} ({} #{}) finished: {}",
            id, updated.job_name, updated.build_number, status
        );
        Ok(updated)
    }

    /// Test cases recorded for an execution, if it finished in this session
    pub fn test_cases(&self, id: ExecutionId) -> Option<Vec<TestCase>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .test_cases
            .get(&id)
            .cloned()
    }
}

/// Combines a known execution with a fresher copy from the engine
fn merge(known: &Execution, incoming: Execution, listed_at: DateTime<Utc>) -> Execution {
    if known.is_terminal() && !incoming.is_terminal() {
        return known.clone();
    }
    settle(
        Execution {
            id: known.id,
            ..incoming
        },
        known.end_time,
        listed_at,
    )
}

/// Makes `end_time` present exactly when the status is terminal
fn settle(
    mut execution: Execution,
    known_end: Option<DateTime<Utc>>,
    listed_at: DateTime<Utc>,
) -> Execution {
    if execution.is_terminal() {
        execution.end_time.get_or_insert(known_end.unwrap_or(listed_at));
    } else {
        execution.end_time = None;
    }
    execution
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGateway, finished, params};
    use chrono::{Duration, TimeZone};
    use jobdeck_core::domain::execution::ExecutionStatus;
    use jobdeck_core::domain::result::TestStatus;

    fn tracker() -> (Arc<FakeGateway>, ExecutionTracker) {
        let gateway = Arc::new(FakeGateway::default());
        let tracker = ExecutionTracker::new(gateway.clone());
        (gateway, tracker)
    }

    fn execution(id: i64, build: &str, minutes_ago: i64) -> Execution {
        let start = Utc.with_ymd_and_hms(2026, 10, 14, 12, 0, 0).unwrap() - Duration::minutes(minutes_ago);
        Execution::queued(
            ExecutionId(id),
            "Platform",
            build,
            params(&[("source", "clusterA"), ("target", "clusterB")]),
            start,
        )
    }

    #[test]
    fn test_next_id_strictly_increases() {
        let (_, tracker) = tracker();
        let a = tracker.next_id();
        let b = tracker.next_id();
        let c = tracker.next_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_register_then_lookup_round_trip() {
        let (_, tracker) = tracker();
        let original = execution(1, "42", 0);
        tracker.register(original.clone()).unwrap();

        assert_eq!(tracker.by_build_number("Platform", "42"), Some(original.clone()));
        assert_eq!(tracker.get(ExecutionId(1)).unwrap(), original);
        assert!(tracker.by_build_number("Configdiff", "42").is_none());
    }

    #[test]
    fn test_register_rejects_duplicate_id() {
        let (_, tracker) = tracker();
        tracker.register(execution(1, "42", 0)).unwrap();
        let err = tracker.register(execution(1, "43", 0)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_get_unknown_is_not_found() {
        let (_, tracker) = tracker();
        assert!(tracker.get(ExecutionId(9)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_record_outcome_sets_end_time_once() {
        let (_, tracker) = tracker();
        tracker.register(execution(1, "42", 0)).unwrap();

        let failed = finished(&[TestStatus::Passed, TestStatus::Failed]);
        let updated = tracker.record_outcome(ExecutionId(1), &failed).unwrap();
        assert_eq!(updated.status, ExecutionStatus::Failed);
        assert!(updated.end_time.is_some());
        assert_eq!(tracker.test_cases(ExecutionId(1)).unwrap().len(), 2);

        let again = tracker
            .record_outcome(ExecutionId(1), &finished(&[TestStatus::Passed]))
            .unwrap();
        assert_eq!(again, updated);
    }

    #[tokio::test]
    async fn test_list_recent_merges_remote_and_local() {
        let (gateway, tracker) = tracker();
        tracker.register(execution(100, "42", 0)).unwrap();

        let mut remote_same_build = execution(7, "42", 1);
        remote_same_build.status = ExecutionStatus::Running;
        *gateway.recent.lock().unwrap() = vec![remote_same_build, execution(8, "40", 30)];

        let listed = tracker.list_recent().await.unwrap();
        assert_eq!(listed.len(), 2);

        let merged = tracker.by_build_number("Platform", "42").unwrap();
        assert_eq!(merged.id, ExecutionId(100));
        assert_eq!(merged.status, ExecutionStatus::Running);
        assert_eq!(listed[1].id, ExecutionId(8));
    }

    #[tokio::test]
    async fn test_list_recent_keeps_local_terminal_outcome() {
        let (gateway, tracker) = tracker();
        tracker.register(execution(100, "42", 0)).unwrap();
        tracker
            .record_outcome(ExecutionId(100), &finished(&[TestStatus::Passed]))
            .unwrap();

        *gateway.recent.lock().unwrap() = vec![execution(7, "42", 0)];
        tracker.list_recent().await.unwrap();

        let kept = tracker.get(ExecutionId(100)).unwrap();
        assert_eq!(kept.status, ExecutionStatus::Passed);
        assert!(kept.end_time.is_some());
    }

    #[tokio::test]
    async fn test_list_recent_settles_end_times() {
        let (gateway, tracker) = tracker();

        let mut finished_without_end = execution(7, "41", 10);
        finished_without_end.status = ExecutionStatus::Passed;

        let mut running_with_end = execution(8, "42", 5);
        running_with_end.status = ExecutionStatus::Running;
        running_with_end.end_time = Some(running_with_end.start_time + Duration::minutes(1));

        *gateway.recent.lock().unwrap() = vec![finished_without_end, running_with_end];
        let before = Utc::now();
        tracker.list_recent().await.unwrap();

        let finished = tracker.get(ExecutionId(7)).unwrap();
        assert!(finished.end_time.is_some_and(|end| end >= before));

        let running = tracker.get(ExecutionId(8)).unwrap();
        assert!(running.end_time.is_none());
    }

    #[tokio::test]
    async fn test_list_recent_keeps_known_end_time() {
        let (gateway, tracker) = tracker();
        tracker.register(execution(100, "42", 0)).unwrap();
        let recorded = tracker
            .record_outcome(ExecutionId(100), &finished(&[TestStatus::Failed]))
            .unwrap();

        let mut remote = execution(7, "42", 0);
        remote.status = ExecutionStatus::Failed;
        *gateway.recent.lock().unwrap() = vec![remote];
        tracker.list_recent().await.unwrap();

        let merged = tracker.get(ExecutionId(100)).unwrap();
        assert_eq!(merged.status, ExecutionStatus::Failed);
        assert_eq!(merged.end_time, recorded.end_time);
    }

    #[tokio::test]
    async fn test_records_are_never_dropped() {
        let (gateway, tracker) = tracker();
        *gateway.recent.lock().unwrap() = vec![execution(7, "41", 5)];
        tracker.list_recent().await.unwrap();

        *gateway.recent.lock().unwrap() = vec![execution(8, "43", 1)];
        let listed = tracker.list_recent().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, ExecutionId(8));
    }
}
