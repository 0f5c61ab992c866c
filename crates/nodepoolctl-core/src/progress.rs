//! Progress tracking and work request polling
//!
//! Mutating Container Engine calls return a work request id right away.
//! The change is only done once that work request reaches a terminal
//! status, so callers poll it. This module provides that polling with
//! optional progress callbacks for UI updates and a cancellation token so
//! an enclosing loop can abort a stuck wait.

use crate::api::{ContainerEngineApi, WorkRequest, WorkRequestId, WorkRequestStatus};
use crate::error::{CoreError, Result};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default time between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default maximum wait for a work request (10 minutes)
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

/// How long and how often to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

impl WaitOptions {
    /// Create validated wait options
    pub fn new(interval: Duration, timeout: Duration) -> Result<Self> {
        let options = Self { interval, timeout };
        options.validate()?;
        Ok(options)
    }

    /// The interval must be positive and no longer than the timeout
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(CoreError::Validation(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.timeout < self.interval {
            return Err(CoreError::Validation(format!(
                "timeout ({:?}) must not be shorter than the poll interval ({:?})",
                self.timeout, self.interval
            )));
        }
        Ok(())
    }
}

/// Progress events emitted while waiting on a work request
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Polling is about to start
    Started { work_request_id: String },
    /// Polling iteration with current status
    Polling {
        work_request_id: String,
        status: WorkRequestStatus,
        elapsed: Duration,
    },
    /// Work request succeeded
    Completed {
        work_request_id: String,
        resources: usize,
    },
    /// Work request failed, was canceled, or the wait gave up
    Failed {
        work_request_id: String,
        error: String,
    },
}

/// Callback type for progress updates
///
/// The CLI uses this to drive its spinner.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Poll a work request until it reaches a terminal status
///
/// The status is always queried at least once, even if the caller believes
/// the work request is already done. Polling stops at the first terminal
/// status, when the timeout has elapsed, or when `cancel` fires.
///
/// # Returns
///
/// The full work request payload on `Succeeded`, for resource correlation.
///
/// # Errors
///
/// * [`CoreError::OperationFailed`] for `Failed` or `Canceled`, with the
///   service's error details when it provides them
/// * [`CoreError::OperationTimedOut`] when no terminal status was seen
///   before `timeout`, including a status query still pending at that
///   point; never raised before that much time has elapsed
/// * [`CoreError::Transport`] for any failed status query, without retry
/// * [`CoreError::Cancelled`] when `cancel` fires
///
/// # Example
///
/// ```rust,ignore
/// use nodepoolctl_core::{poll_work_request, ProgressEvent, WaitOptions};
/// use tokio_util::sync::CancellationToken;
///
/// let id = client.create_node_pool(&details).await?;
/// let completed = poll_work_request(
///     &client,
///     &id,
///     &WaitOptions::default(),
///     &CancellationToken::new(),
///     Some(Box::new(|event| {
///         if let ProgressEvent::Polling { status, elapsed, .. } = event {
///             println!("Status: {} ({:.0}s)", status, elapsed.as_secs());
///         }
///     })),
/// ).await?;
/// ```
pub async fn poll_work_request<A>(
    api: &A,
    work_request_id: &WorkRequestId,
    options: &WaitOptions,
    cancel: &CancellationToken,
    on_progress: Option<ProgressCallback>,
) -> Result<WorkRequest>
where
    A: ContainerEngineApi + ?Sized,
{
    if work_request_id.as_str().trim().is_empty() {
        return Err(CoreError::Validation(
            "work request id must not be empty".to_string(),
        ));
    }
    options.validate()?;

    let start = Instant::now();
    let id = work_request_id.as_str();

    emit(
        &on_progress,
        ProgressEvent::Started {
            work_request_id: id.to_string(),
        },
    );

    let deadline = start + options.timeout;

    loop {
        // A status query that hangs past the deadline counts as a timeout
        let work_request = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CoreError::Cancelled),
            result = tokio::time::timeout_at(deadline, api.get_work_request(work_request_id)) => {
                match result {
                    Ok(result) => result?,
                    Err(_) => return Err(timed_out(&on_progress, id, options.timeout, start)),
                }
            }
        };
        let elapsed = start.elapsed();
        let status = work_request.status.clone();

        debug!(work_request = id, %status, ?elapsed, "Polled work request");
        emit(
            &on_progress,
            ProgressEvent::Polling {
                work_request_id: id.to_string(),
                status: status.clone(),
                elapsed,
            },
        );

        match status {
            WorkRequestStatus::Succeeded => {
                info!(work_request = id, ?elapsed, "Work request succeeded");
                emit(
                    &on_progress,
                    ProgressEvent::Completed {
                        work_request_id: id.to_string(),
                        resources: work_request.resources.len(),
                    },
                );
                return Ok(work_request);
            }
            WorkRequestStatus::Failed | WorkRequestStatus::Canceled => {
                let detail =
                    failure_detail(api, work_request_id, &status, deadline, cancel).await?;
                warn!(work_request = id, %status, "Work request did not succeed: {}", detail);
                emit(
                    &on_progress,
                    ProgressEvent::Failed {
                        work_request_id: id.to_string(),
                        error: detail.clone(),
                    },
                );
                return Err(CoreError::OperationFailed { status, detail });
            }
            // Accepted, InProgress, Canceling or something new - still going
            _ => {}
        }

        if elapsed >= options.timeout {
            return Err(timed_out(&on_progress, id, options.timeout, start));
        }

        // The last pause is shortened so the final poll lands on the deadline
        let pause = options.interval.min(options.timeout - elapsed);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CoreError::Cancelled),
            _ = tokio::time::sleep(pause) => {}
        }
    }
}

fn timed_out(
    on_progress: &Option<ProgressCallback>,
    id: &str,
    timeout: Duration,
    start: Instant,
) -> CoreError {
    warn!(work_request = id, elapsed = ?start.elapsed(), "Gave up waiting for work request");
    emit(
        on_progress,
        ProgressEvent::Failed {
            work_request_id: id.to_string(),
            error: format!("timed out after {:?}", timeout),
        },
    );
    CoreError::OperationTimedOut(timeout)
}

/// Describe why a work request ended unsuccessfully
///
/// Uses the service's error list when it has one. Failing to fetch that
/// list before `deadline` doesn't hide the original failure.
async fn failure_detail<A>(
    api: &A,
    id: &WorkRequestId,
    status: &WorkRequestStatus,
    deadline: Instant,
    cancel: &CancellationToken,
) -> Result<String>
where
    A: ContainerEngineApi + ?Sized,
{
    let fallback = format!("work request {} finished with status {}", id, status);

    let listed = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(CoreError::Cancelled),
        result = tokio::time::timeout_at(deadline, api.list_work_request_errors(id)) => result,
    };

    Ok(match listed {
        Ok(Ok(errors)) if !errors.is_empty() => errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; "),
        Ok(Ok(_)) => fallback,
        Ok(Err(e)) => {
            warn!(work_request = %id, "Could not fetch work request errors: {}", e);
            fallback
        }
        Err(_) => {
            warn!(work_request = %id, "Timed out fetching work request errors");
            fallback
        }
    })
}

/// Helper to emit progress events
fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ActionType, WorkRequestError};
    use crate::testing::{FakeEngine, PollStep, resource, work_request};
    use std::sync::{Arc, Mutex};

    fn wr_id() -> WorkRequestId {
        WorkRequestId::new("wr-1").unwrap()
    }

    fn options(interval: u64, timeout: u64) -> WaitOptions {
        WaitOptions::new(Duration::from_secs(interval), Duration::from_secs(timeout)).unwrap()
    }

    #[test]
    fn test_wait_options_validation() {
        assert!(WaitOptions::new(Duration::ZERO, Duration::from_secs(5)).is_err());
        assert!(WaitOptions::new(Duration::from_secs(10), Duration::from_secs(5)).is_err());
        assert!(WaitOptions::new(Duration::from_secs(5), Duration::from_secs(5)).is_ok());
        assert_eq!(WaitOptions::default().interval, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_in_progress() {
        let engine = FakeEngine::new();
        engine.script_work_request([
            PollStep::status(WorkRequestStatus::InProgress),
            PollStep::status(WorkRequestStatus::InProgress),
            PollStep::Status(work_request(
                WorkRequestStatus::Succeeded,
                vec![resource(ActionType::Created, "NODEPOOL", "pool-123")],
            )),
        ]);

        let result = poll_work_request(
            &engine,
            &wr_id(),
            &options(1, 60),
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.status, WorkRequestStatus::Succeeded);
        assert_eq!(result.resources[0].identifier, "pool-123");
        assert_eq!(engine.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_once_when_already_terminal() {
        let engine = FakeEngine::new();
        engine.script_work_request([PollStep::status(WorkRequestStatus::Succeeded)]);

        poll_work_request(
            &engine,
            &wr_id(),
            &options(1, 60),
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap();

        assert_eq!(engine.poll_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_no_earlier_than_timeout() {
        let engine = FakeEngine::new();
        engine.script_work_request([PollStep::status(WorkRequestStatus::InProgress)]);

        let start = Instant::now();
        let err = poll_work_request(
            &engine,
            &wr_id(),
            &options(2, 7),
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CoreError::OperationTimedOut(d) if d == Duration::from_secs(7)));
        assert!(start.elapsed() >= Duration::from_secs(7));
        // Polls at 0, 2, 4, 6 and the shortened final pause lands on 7
        assert_eq!(engine.poll_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_status_query_times_out_at_deadline() {
        let engine = FakeEngine::new();
        engine.script_work_request([PollStep::Hang]);

        let start = Instant::now();
        let result = tokio::time::timeout(
            Duration::from_secs(3600),
            poll_work_request(
                &engine,
                &wr_id(),
                &options(1, 5),
                &CancellationToken::new(),
                None,
            ),
        )
        .await
        .expect("poller outlived its timeout");

        assert!(matches!(result, Err(CoreError::OperationTimedOut(d)) if d == Duration::from_secs(5)));
        assert!(start.elapsed() >= Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_error_listing_falls_back_at_deadline() {
        let engine = FakeEngine::new();
        engine.script_work_request([PollStep::status(WorkRequestStatus::Failed)]);
        engine.hang_error_listing();

        let start = Instant::now();
        let result = tokio::time::timeout(
            Duration::from_secs(3600),
            poll_work_request(
                &engine,
                &wr_id(),
                &options(1, 30),
                &CancellationToken::new(),
                None,
            ),
        )
        .await
        .expect("poller outlived its timeout");

        match result {
            Err(CoreError::OperationFailed { status, detail }) => {
                assert_eq!(status, WorkRequestStatus::Failed);
                assert_eq!(detail, "work request wr-1 finished with status FAILED");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(start.elapsed() <= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_hung_status_query() {
        let engine = FakeEngine::new();
        engine.script_work_request([PollStep::Hang]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            trigger.cancel();
        });

        let err = poll_work_request(&engine, &wr_id(), &options(1, 600), &cancel, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_status_carries_remote_detail() {
        let engine = FakeEngine::new();
        engine.script_work_request([
            PollStep::status(WorkRequestStatus::InProgress),
            PollStep::status(WorkRequestStatus::Failed),
        ]);
        engine.set_work_request_errors(vec![WorkRequestError {
            code: "LimitExceeded".to_string(),
            message: "service limit reached".to_string(),
            timestamp: None,
        }]);

        let err = poll_work_request(
            &engine,
            &wr_id(),
            &options(1, 60),
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap_err();

        match err {
            CoreError::OperationFailed { status, detail } => {
                assert_eq!(status, WorkRequestStatus::Failed);
                assert_eq!(detail, "LimitExceeded: service limit reached");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_canceled_status_is_failure() {
        let engine = FakeEngine::new();
        engine.script_work_request([PollStep::status(WorkRequestStatus::Canceled)]);

        let err = poll_work_request(
            &engine,
            &wr_id(),
            &options(1, 60),
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            CoreError::OperationFailed {
                status: WorkRequestStatus::Canceled,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_not_retried() {
        let engine = FakeEngine::new();
        engine.script_work_request([
            PollStep::status(WorkRequestStatus::InProgress),
            PollStep::Error(503),
            PollStep::status(WorkRequestStatus::Succeeded),
        ]);

        let err = poll_work_request(
            &engine,
            &wr_id(),
            &options(1, 60),
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CoreError::Transport(_)));
        assert_eq!(engine.poll_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_wait() {
        let engine = FakeEngine::new();
        engine.script_work_request([PollStep::status(WorkRequestStatus::InProgress)]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            trigger.cancel();
        });

        let start = Instant::now();
        let err = poll_work_request(&engine, &wr_id(), &options(1, 600), &cancel, None)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Cancelled));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_events() {
        let engine = FakeEngine::new();
        engine.script_work_request([
            PollStep::status(WorkRequestStatus::Accepted),
            PollStep::status(WorkRequestStatus::Succeeded),
        ]);

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let callback: ProgressCallback = Box::new(move |event| {
            let label = match event {
                ProgressEvent::Started { .. } => "started".to_string(),
                ProgressEvent::Polling { status, .. } => format!("polling:{status}"),
                ProgressEvent::Completed { .. } => "completed".to_string(),
                ProgressEvent::Failed { .. } => "failed".to_string(),
            };
            sink.lock().unwrap().push(label);
        });

        poll_work_request(
            &engine,
            &wr_id(),
            &options(1, 60),
            &CancellationToken::new(),
            Some(callback),
        )
        .await
        .unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                "started",
                "polling:ACCEPTED",
                "polling:SUCCEEDED",
                "completed"
            ]
        );
    }
}
