//! Execution State Tracker.
//!
//! Drives an execution to a terminal state by reading it through an
//! [`ExecutionGateway`] and sleeping between non-terminal observations. The
//! wait is bounded by a [`WaitControl`]: an optional deadline plus a
//! cancellation token the caller can trip (the CLI trips it on Ctrl+C).
//! Stopping a wait never cancels the remote execution.

use std::future::{Future, pending};
use std::time::Duration;

use gcphcp_api::{CancelReason, ExecutionGateway, WorkflowError};
use gcphcp_types::{ExecutionHandle, ExecutionRecord, ExecutionState};
use tokio::time::{Instant, sleep, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backoff::PollPolicy;

const WAIT_ACTION: &str = "waiting for execution";

/// Caller-owned bounds on a blocking wait.
#[derive(Debug, Clone, Default)]
pub struct WaitControl {
    /// Maximum time to wait; `None` waits until terminal or cancelled.
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

impl WaitControl {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// One read performed while waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollObservation {
    pub attempt: u32,
    pub state: ExecutionState,
    /// Delay before the next read; `None` once the state is terminal.
    pub next_delay: Option<Duration>,
}

/// Polls one execution at a time through a borrowed gateway.
pub struct ExecutionTracker<'a, G: ExecutionGateway + ?Sized> {
    gateway: &'a G,
    policy: PollPolicy,
}

impl<'a, G: ExecutionGateway + ?Sized> ExecutionTracker<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self {
            gateway,
            policy: PollPolicy::default(),
        }
    }

    /// Wait until `handle` reaches a terminal state.
    ///
    /// Returns the single terminal read. A read failure aborts the wait and is
    /// returned as-is; only non-terminal observations are retried.
    pub async fn wait_for_completion(
        &self,
        handle: &ExecutionHandle,
        control: &WaitControl,
    ) -> Result<ExecutionRecord, WorkflowError> {
        self.wait_for_completion_with_observer(handle, control, |_| {}).await
    }

    /// Wait for completion and notify `observer` after every read.
    pub async fn wait_for_completion_with_observer<F>(
        &self,
        handle: &ExecutionHandle,
        control: &WaitControl,
        mut observer: F,
    ) -> Result<ExecutionRecord, WorkflowError>
    where
        F: FnMut(&PollObservation),
    {
        let deadline = control.timeout.map(|timeout| Instant::now() + timeout);
        let mut backoff = self.policy.backoff();
        let mut attempt = 0u32;
        let mut highest_rank = 0u8;

        info!(execution = %handle, timeout = ?control.timeout, "waiting for execution");

        loop {
            attempt += 1;
            let record = bounded(control, deadline, self.gateway.get_execution(handle))
                .await?
                .inspect_err(|error| warn!(execution = %handle, attempt, error = %error, "poll failed; aborting wait"))?;

            if record.state.rank() < highest_rank {
                warn!(execution = %handle, state = %record.state, "execution state moved backwards");
            }
            highest_rank = highest_rank.max(record.state.rank());

            if record.is_terminal() {
                observer(&PollObservation {
                    attempt,
                    state: record.state,
                    next_delay: None,
                });
                info!(execution = %handle, state = %record.state, attempts = attempt, "execution reached terminal state");
                return Ok(record);
            }

            let delay = backoff.next_delay();
            observer(&PollObservation {
                attempt,
                state: record.state,
                next_delay: Some(delay),
            });
            debug!(
                execution = %handle,
                attempt,
                state = %record.state,
                delay_ms = delay.as_millis(),
                "execution not terminal; backing off"
            );
            bounded(control, deadline, sleep(delay)).await?;
        }
    }
}

/// Race `work` against the deadline and the cancellation token.
async fn bounded<T>(
    control: &WaitControl,
    deadline: Option<Instant>,
    work: impl Future<Output = T>,
) -> Result<T, WorkflowError> {
    let expiry = async {
        match deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => pending::<()>().await,
        }
    };

    tokio::select! {
        biased;
        _ = control.cancel.cancelled() => Err(cancelled(CancelReason::Cancelled)),
        _ = expiry => Err(cancelled(CancelReason::DeadlineElapsed(control.timeout.unwrap_or_default()))),
        value = work => Ok(value),
    }
}

fn cancelled(reason: CancelReason) -> WorkflowError {
    warn!(%reason, "stopped waiting; remote execution keeps running");
    WorkflowError::Cancelled {
        action: WAIT_ACTION.to_string(),
        reason,
    }
}
