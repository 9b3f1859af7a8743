//! Result poller
//!
//! Polls the engine for one build's test results until they are final,
//! the engine reports a failure, or the watch is cancelled.
//!
//! A watch issues one fetch at a time. After a fetch that shows the build
//! still running it sleeps for the poll interval and fetches again. The
//! first terminal observation, success or failure, is delivered once and
//! the loop ends; a failed fetch is not retried.

use jobdeck_client::CiGateway;
use jobdeck_core::domain::execution::ExecutionStatus;
use jobdeck_core::domain::result::JobResult;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Terminal observation of a watched build
#[derive(Debug)]
pub enum PollUpdate {
    /// Test cases arrived or the engine reported a terminal status
    Finished {
        status: ExecutionStatus,
        result: JobResult,
    },
    /// The fetch failed or the engine answered `success: false`
    Failed(Error),
}

type Callback = Box<dyn FnOnce(PollUpdate) + Send + 'static>;

/// Slot holding the not-yet-delivered callback
///
/// Cancelling and delivering both take this lock, so once
/// [`WatchHandle::cancel`] returns the callback can no longer be taken.
type Delivery = Arc<Mutex<Option<Callback>>>;

/// Spawns independent polling tasks
#[derive(Clone)]
pub struct ResultPoller {
    gateway: Arc<dyn CiGateway>,
    interval: Duration,
}

impl ResultPoller {
    /// Creates a poller re-fetching every `interval`
    pub fn new(gateway: Arc<dyn CiGateway>, interval: Duration) -> Self {
        Self { gateway, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts watching build `build_number` of `job_name`
    ///
    /// The first fetch is issued immediately. `on_update` is called at
    /// most once, from the polling task. Dropping or cancelling the
    /// returned handle stops the watch; a response still in flight at
    /// that point is discarded. Must be called inside a tokio runtime.
    pub fn watch<F>(
        &self,
        job_name: impl Into<String>,
        build_number: impl Into<String>,
        on_update: F,
    ) -> WatchHandle
    where
        F: FnOnce(PollUpdate) + Send + 'static,
    {
        let job_name = job_name.into();
        let build_number = build_number.into();
        let token = CancellationToken::new();
        let delivery: Delivery = Arc::new(Mutex::new(Some(Box::new(on_update))));

        debug!("Watching {} #{}", job_name, build_number);

        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.gateway),
            job_name,
            build_number,
            self.interval,
            token.clone(),
            Arc::clone(&delivery),
        ));

        WatchHandle {
            token,
            delivery,
            task: Some(task),
        }
    }

    /// Fetches a build's results exactly once
    ///
    /// `success: false` is returned as an application error. A result
    /// that is not yet finished is returned as is.
    pub async fn check_once(&self, job_name: &str, build_number: &str) -> Result<JobResult> {
        let result = self.gateway.job_results(job_name, build_number).await?;
        if !result.success {
            return Err(Error::Application(result.failure_message()));
        }
        Ok(result)
    }
}

/// Cancellation handle of one watch
///
/// Dropping the handle cancels the watch.
pub struct WatchHandle {
    token: CancellationToken,
    delivery: Delivery,
    task: Option<JoinHandle<()>>,
}

impl WatchHandle {
    /// Stops the watch
    ///
    /// After this returns no further fetch is issued and the update
    /// callback is never invoked, unless it was already running.
    pub fn cancel(&self) {
        let mut slot = self.delivery.lock().unwrap_or_else(PoisonError::into_inner);
        self.token.cancel();
        slot.take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the polling task has ended
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Waits for the polling task to end without cancelling it
    pub async fn finished(mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        if let Err(e) = task.await {
            warn!("Result watch task panicked: {}", e);
        }
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn poll_loop(
    gateway: Arc<dyn CiGateway>,
    job_name: String,
    build_number: String,
    interval: Duration,
    token: CancellationToken,
    delivery: Delivery,
) {
    let mut attempt: u32 = 0;

    loop {
        if token.is_cancelled() {
            return;
        }
        attempt += 1;
        debug!(
            "Fetching results for {} #{} (attempt {})",
            job_name, build_number, attempt
        );

        let fetched = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("Watch of {} #{} cancelled with a fetch in flight", job_name, build_number);
                return;
            }
            fetched = gateway.job_results(&job_name, &build_number) => fetched,
        };

        let update = match fetched {
            Err(e) => {
                warn!("Fetching results for {} #{} failed: {}", job_name, build_number, e);
                Some(PollUpdate::Failed(e.into()))
            }
            Ok(result) if !result.success => {
                let message = result.failure_message();
                warn!("Engine rejected results for {} #{}: {}", job_name, build_number, message);
                Some(PollUpdate::Failed(Error::Application(message)))
            }
            Ok(result) if result.is_finished() => {
                let status = result.outcome();
                info!(
                    "{} #{} finished: {} ({} test case(s))",
                    job_name,
                    build_number,
                    status,
                    result.data.test_cases.len()
                );
                Some(PollUpdate::Finished { status, result })
            }
            Ok(_) => None,
        };

        if let Some(update) = update {
            deliver(&token, &delivery, update);
            return;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(interval) => {}
        }
    }
}

/// Hands `update` to the callback unless the watch was cancelled first
fn deliver(token: &CancellationToken, delivery: &Delivery, update: PollUpdate) {
    let callback = {
        let mut slot = delivery.lock().unwrap_or_else(PoisonError::into_inner);
        if token.is_cancelled() {
            None
        } else {
            slot.take()
        }
    };

    match callback {
        Some(callback) => callback(update),
        None => debug!("Dropping update for a cancelled watch"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGateway, finished, rejected, running, unreachable};
    use jobdeck_client::ClientError;
    use jobdeck_core::domain::result::TestStatus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    const INTERVAL: Duration = Duration::from_secs(30);

    fn poller() -> (Arc<FakeGateway>, ResultPoller) {
        let gateway = Arc::new(FakeGateway::default());
        (gateway.clone(), ResultPoller::new(gateway, INTERVAL))
    }

    fn channel_watch(
        poller: &ResultPoller,
        build: &str,
    ) -> (WatchHandle, mpsc::UnboundedReceiver<PollUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = poller.watch("Platform", build, move |update| {
            let _ = tx.send(update);
        });
        (handle, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivers_once_after_running_polls() {
        let (gateway, poller) = poller();
        gateway.push_result(Ok(running()));
        gateway.push_result(Ok(running()));
        gateway.push_result(Ok(finished(&[TestStatus::Passed])));

        let (handle, mut rx) = channel_watch(&poller, "42");
        handle.finished().await;

        let update = rx.recv().await.unwrap();
        match update {
            PollUpdate::Finished { status, result } => {
                assert_eq!(status, ExecutionStatus::Passed);
                assert_eq!(result.data.test_cases.len(), 1);
            }
            other => panic!("unexpected update {other:?}"),
        }
        assert!(rx.recv().await.is_none());

        let times = gateway.fetch_times();
        assert_eq!(times.len(), 3);
        assert!(times[1] - times[0] >= INTERVAL);
        assert!(times[2] - times[1] >= INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_status_without_cases_stops() {
        let (gateway, poller) = poller();
        let mut aborted = running();
        aborted.data.status = "ABORTED".to_string();
        gateway.push_result(Ok(aborted));

        let (handle, mut rx) = channel_watch(&poller, "42");
        handle.finished().await;

        assert!(matches!(
            rx.recv().await,
            Some(PollUpdate::Finished {
                status: ExecutionStatus::Aborted,
                ..
            })
        ));
        assert_eq!(gateway.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_built_stops_as_aborted() {
        let (gateway, poller) = poller();
        let mut not_built = running();
        not_built.data.status = "NOT_BUILT".to_string();
        gateway.push_result(Ok(not_built));

        let (handle, mut rx) = channel_watch(&poller, "42");
        handle.finished().await;

        assert!(matches!(
            rx.recv().await,
            Some(PollUpdate::Finished {
                status: ExecutionStatus::Aborted,
                ..
            })
        ));
        assert_eq!(gateway.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_response() {
        let (gateway, poller) = poller();
        *gateway.result_delay.lock().unwrap() = Duration::from_secs(5);
        gateway.push_result(Ok(finished(&[TestStatus::Passed])));

        let delivered = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&delivered);
        let handle = poller.watch("Platform", "42", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        while gateway.fetch_count() == 0 {
            tokio::task::yield_now().await;
        }
        handle.cancel();
        assert!(handle.is_cancelled());

        tokio::time::sleep(INTERVAL * 4).await;
        assert_eq!(delivered.load(Ordering::SeqCst), 0);
        assert_eq!(gateway.fetch_count(), 1);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_between_polls_stops_fetching() {
        let (gateway, poller) = poller();
        let (handle, mut rx) = channel_watch(&poller, "42");

        tokio::time::sleep(INTERVAL + INTERVAL / 2).await;
        assert_eq!(gateway.fetch_count(), 2);

        drop(handle);
        tokio::time::sleep(INTERVAL * 4).await;
        assert_eq!(gateway.fetch_count(), 2);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_is_terminal() {
        let (gateway, poller) = poller();
        gateway.push_result(Err(unreachable()));

        let (handle, mut rx) = channel_watch(&poller, "42");
        handle.finished().await;

        match rx.recv().await {
            Some(PollUpdate::Failed(err)) => {
                assert!(err.is_transport());
                assert!(err.is_retryable());
            }
            other => panic!("unexpected update {other:?}"),
        }
        assert_eq!(gateway.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decode_failure_is_terminal() {
        let (gateway, poller) = poller();
        gateway.push_result(Err(ClientError::ParseError(
            "expected value at line 1 column 1".to_string(),
        )));

        let (handle, mut rx) = channel_watch(&poller, "42");
        handle.finished().await;

        match rx.recv().await {
            Some(PollUpdate::Failed(err)) => {
                assert!(err.is_transport());
                assert!(!err.is_retryable());
            }
            other => panic!("unexpected update {other:?}"),
        }
        assert!(rx.recv().await.is_none());

        tokio::time::sleep(INTERVAL * 4).await;
        assert_eq!(gateway.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_application_failure_is_terminal() {
        let (gateway, poller) = poller();
        gateway.push_result(Ok(rejected("No report.json found")));

        let (handle, mut rx) = channel_watch(&poller, "42");
        handle.finished().await;

        match rx.recv().await {
            Some(PollUpdate::Failed(Error::Application(message))) => {
                assert_eq!(message, "No report.json found")
            }
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_watches_are_independent() {
        let (gateway, poller) = poller();
        let (first, mut first_rx) = channel_watch(&poller, "1");
        let (second, mut second_rx) = channel_watch(&poller, "2");

        tokio::time::sleep(INTERVAL / 2).await;
        first.cancel();
        gateway.push_result(Ok(finished(&[TestStatus::Failed])));

        second.finished().await;
        match second_rx.recv().await {
            Some(PollUpdate::Finished { status, .. }) => assert_eq!(status, ExecutionStatus::Failed),
            other => panic!("unexpected update {other:?}"),
        }
        assert!(first_rx.recv().await.is_none());

        let builds: Vec<String> = gateway
            .fetches
            .lock()
            .unwrap()
            .iter()
            .map(|(_, build, _)| build.clone())
            .collect();
        assert_eq!(builds, vec!["1", "2", "2"]);
    }

    #[tokio::test]
    async fn test_check_once() {
        let (gateway, poller) = poller();
        let result = poller.check_once("Platform", "42").await.unwrap();
        assert!(!result.is_finished());

        gateway.push_result(Ok(rejected("boom")));
        assert!(poller.check_once("Platform", "42").await.unwrap_err().is_application());
        assert_eq!(gateway.fetch_count(), 2);
    }
}
