//! Run, status and resume orchestration over the gateway traits.

use gcphcp_api::{CallbackGateway, ExecutionGateway, WorkflowError};
use gcphcp_types::{CallbackDescriptor, ExecutionHandle, ExecutionRecord, ExecutionState};
use serde_json::Value;
use tracing::{info, warn};

use crate::tracker::{ExecutionTracker, WaitControl};

/// A created execution and the outcome of waiting on it.
///
/// The handle is kept even when the wait fails so callers can tell the user
/// how to re-attach to the still-running execution.
#[derive(Debug)]
pub struct RunOutcome {
    pub handle: ExecutionHandle,
    pub wait: Result<ExecutionRecord, WorkflowError>,
}

/// Create an execution of `workflow` and wait for it to finish.
pub async fn run_workflow<G>(
    gateway: &G,
    workflow: &str,
    argument: &Value,
    control: &WaitControl,
) -> Result<RunOutcome, WorkflowError>
where
    G: ExecutionGateway + ?Sized,
{
    let handle = gateway.create_execution(workflow, argument).await?;
    info!(execution = %handle, workflow, "execution started");
    let wait = ExecutionTracker::new(gateway).wait_for_completion(&handle, control).await;
    Ok(RunOutcome { handle, wait })
}

/// Point-in-time view of an execution with its pending callbacks.
#[derive(Debug, Clone)]
pub struct ExecutionStatus {
    pub record: ExecutionRecord,
    pub callbacks: Vec<CallbackDescriptor>,
}

impl ExecutionStatus {
    pub fn is_waiting_on_callback(&self) -> bool {
        self.record.state == ExecutionState::Active && !self.callbacks.is_empty()
    }

    /// State label, annotated when the execution is paused on a callback.
    pub fn state_label(&self) -> String {
        if self.is_waiting_on_callback() {
            format!("{} (waiting on callback)", self.record.state)
        } else {
            self.record.state.to_string()
        }
    }
}

/// Read an execution and, when it is ACTIVE, its pending callbacks.
///
/// Callbacks are listed under the name the server returned, which carries
/// the project number rather than the project ID.
///
/// Callback discovery is best-effort here: a listing failure is logged and
/// the status is returned without callbacks.
pub async fn execution_status<G>(gateway: &G, handle: &ExecutionHandle) -> Result<ExecutionStatus, WorkflowError>
where
    G: ExecutionGateway + CallbackGateway + ?Sized,
{
    let record = gateway.get_execution(handle).await?;
    let callbacks = if record.state == ExecutionState::Active {
        gateway.list_callbacks(&record.handle).await.unwrap_or_else(|error| {
            warn!(execution = %record.handle, error = %error, "could not list callbacks");
            Vec::new()
        })
    } else {
        Vec::new()
    };
    Ok(ExecutionStatus { record, callbacks })
}

/// Result of resuming a paused execution.
#[derive(Debug)]
pub struct ResumeOutcome {
    pub callback: CallbackDescriptor,
    /// Terminal record when the caller asked to wait.
    pub record: Option<ExecutionRecord>,
}

/// Fire the first pending callback of an ACTIVE execution.
///
/// Fails with `UnexpectedCallbackState` when the execution is not ACTIVE and
/// with `NoCompatibleCallback` when it is ACTIVE without pending callbacks.
/// With `wait` set, the execution is then tracked to completion.
pub async fn resume_execution<G>(
    gateway: &G,
    handle: &ExecutionHandle,
    payload: Option<&Value>,
    wait: Option<&WaitControl>,
) -> Result<ResumeOutcome, WorkflowError>
where
    G: ExecutionGateway + CallbackGateway + ?Sized,
{
    let current = gateway.get_execution(handle).await?;
    if current.state != ExecutionState::Active {
        return Err(WorkflowError::UnexpectedCallbackState {
            execution: current.handle,
            state: current.state,
        });
    }

    let callback = gateway
        .list_callbacks(&current.handle)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| WorkflowError::NoCompatibleCallback {
            execution: current.handle.clone(),
        })?;

    gateway.trigger_callback(&callback.url, &callback.method, payload).await?;
    info!(execution = %current.handle, callback = %callback.name, "callback triggered");

    let record = match wait {
        Some(control) => Some(ExecutionTracker::new(gateway).wait_for_completion(handle, control).await?),
        None => None,
    };
    Ok(ResumeOutcome { callback, record })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedGateway, handle};
    use gcphcp_types::ExecutionHandle;
    use gcphcp_api::{ErrorKind, classify};
    use serde_json::json;

    fn callback(id: &str) -> CallbackDescriptor {
        let name = format!("{}/callbacks/{id}", handle());
        CallbackDescriptor {
            url: format!("https://workflowexecutions.googleapis.com/v1/{name}"),
            name,
            method: "POST".into(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn run_creates_then_waits() {
        let gateway = ScriptedGateway::with_states([ExecutionState::Active, ExecutionState::Succeeded]);
        let argument = json!({ "resource_type": "pods", "namespace": "hypershift" });

        let outcome = run_workflow(&gateway, "get", &argument, &WaitControl::default())
            .await
            .expect("created");

        assert_eq!(outcome.handle.workflow(), "get");
        let record = outcome.wait.expect("finished");
        assert_eq!(record.state, ExecutionState::Succeeded);
        assert_eq!(record.result, Some(json!({ "items": [] })));
        assert_eq!(gateway.created.lock().unwrap()[0], ("get".to_string(), argument));
    }

    #[tokio::test(start_paused = true)]
    async fn run_keeps_the_handle_when_the_wait_times_out() {
        let gateway = ScriptedGateway::forever(ExecutionState::Active);
        let control = WaitControl::with_timeout(std::time::Duration::from_millis(100));

        let outcome = run_workflow(&gateway, "get", &json!({}), &control).await.expect("created");

        assert_eq!(outcome.handle.id(), "e1");
        assert_eq!(outcome.wait.expect_err("timed out").kind(), ErrorKind::CancelledOrTimedOut);
    }

    #[tokio::test]
    async fn status_attaches_pending_callbacks() {
        let gateway = ScriptedGateway::with_states([ExecutionState::Active]).with_callbacks(vec![callback("cb1")]);

        let status = execution_status(&gateway, &handle()).await.expect("status");

        assert!(status.is_waiting_on_callback());
        assert_eq!(status.state_label(), "ACTIVE (waiting on callback)");
    }

    #[tokio::test]
    async fn status_ignores_callback_listing_failures() {
        let mut gateway = ScriptedGateway::with_states([ExecutionState::Active]);
        gateway.callbacks_error = Some(classify("listing callbacks", "connection refused"));

        let status = execution_status(&gateway, &handle()).await.expect("status");

        assert!(status.callbacks.is_empty());
        assert_eq!(status.state_label(), "ACTIVE");
    }

    #[tokio::test(start_paused = true)]
    async fn resume_triggers_first_callback_and_waits() {
        let gateway = ScriptedGateway::with_states([ExecutionState::Active, ExecutionState::Active, ExecutionState::Succeeded])
            .with_callbacks(vec![callback("cb1"), callback("cb2")]);
        let payload = json!({ "approved": true });

        let outcome = resume_execution(&gateway, &handle(), Some(&payload), Some(&WaitControl::default()))
            .await
            .expect("resumed");

        assert_eq!(outcome.callback.name, callback("cb1").name);
        assert_eq!(outcome.record.map(|record| record.state), Some(ExecutionState::Succeeded));
        let triggered = gateway.triggered.lock().unwrap();
        assert_eq!(triggered.len(), 1);
        assert_eq!(triggered[0].0, callback("cb1").url);
        assert_eq!(triggered[0].2, Some(payload));
    }

    #[tokio::test]
    async fn resume_rejects_non_active_executions() {
        let gateway = ScriptedGateway::with_states([ExecutionState::Succeeded]).with_callbacks(vec![callback("cb1")]);

        let error = resume_execution(&gateway, &handle(), None, None).await.expect_err("not active");

        assert_eq!(error.kind(), ErrorKind::UnexpectedCallbackState);
        assert!(gateway.triggered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn resume_without_callbacks_is_incompatible() {
        let gateway = ScriptedGateway::with_states([ExecutionState::Active]);

        let error = resume_execution(&gateway, &handle(), None, None).await.expect_err("no callbacks");

        assert_eq!(error.kind(), ErrorKind::NoCompatibleCallback);
    }

    fn numbered_handle() -> ExecutionHandle {
        ExecutionHandle::parse("projects/123456789/locations/us-central1/workflows/get/executions/e1").expect("handle")
    }

    #[tokio::test]
    async fn status_lists_callbacks_under_the_server_name() {
        let gateway = ScriptedGateway::with_states([ExecutionState::Active])
            .with_callbacks(vec![callback("cb1")])
            .with_server_handle(numbered_handle());

        let status = execution_status(&gateway, &handle()).await.expect("status");

        assert!(status.is_waiting_on_callback());
        assert_eq!(*gateway.listed_for.lock().unwrap(), vec![numbered_handle()]);
    }

    #[tokio::test]
    async fn resume_lists_callbacks_under_the_server_name() {
        let gateway = ScriptedGateway::with_states([ExecutionState::Active])
            .with_callbacks(vec![callback("cb1")])
            .with_server_handle(numbered_handle());

        let outcome = resume_execution(&gateway, &handle(), None, None).await.expect("resumed");

        assert_eq!(outcome.callback.name, callback("cb1").name);
        assert_eq!(*gateway.listed_for.lock().unwrap(), vec![numbered_handle()]);
        assert_eq!(gateway.triggered.lock().unwrap().len(), 1);
    }
}
