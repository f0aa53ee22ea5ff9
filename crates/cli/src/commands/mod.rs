pub mod ops;
pub mod version;
pub mod wf;

use std::time::Duration;

use anyhow::{Result, bail};
use gcphcp_api::WorkflowError;
use gcphcp_engine::run_workflow;
use gcphcp_types::{ExecutionHandle, ExecutionRecord, ExecutionState};
use gcphcp_util::{OutputFormat, render_structured};
use serde::Serialize;
use serde_json::Value;

use crate::render::status_command;
use crate::session::Session;

/// Run `workflow` to completion and return its SUCCEEDED result.
pub(crate) async fn run_for_result(session: &Session, workflow: &str, argument: &Value, timeout: Duration) -> Result<Value> {
    let client = session.connect().await?;
    let outcome = run_workflow(&client, workflow, argument, &session.wait_control(timeout)).await?;
    let record = finish_wait(&outcome.handle, outcome.wait)?;
    client.close();
    into_result(record)
}

/// Unwrap a wait outcome. When the wait was abandoned the execution is still
/// running, so tell the user how to check on it.
pub(crate) fn finish_wait(handle: &ExecutionHandle, wait: Result<ExecutionRecord, WorkflowError>) -> Result<ExecutionRecord> {
    wait.map_err(|error| {
        if error.is_cancellation() {
            print_detach_hint(handle);
        }
        anyhow::Error::new(error).context("waiting for workflow")
    })
}

pub(crate) fn print_detach_hint(handle: &ExecutionHandle) {
    eprintln!("\nThe execution keeps running. Check status with:\n  {}", status_command(handle));
}

pub(crate) fn into_result(record: ExecutionRecord) -> Result<Value> {
    match record.state {
        ExecutionState::Succeeded => Ok(record.result.unwrap_or(Value::Null)),
        ExecutionState::Failed => bail!("workflow failed: {}", record.failure_context.unwrap_or_default()),
        state => bail!("workflow ended in state {state}"),
    }
}

pub(crate) fn print_structured<T: Serialize + ?Sized>(format: OutputFormat, data: &T) -> Result<()> {
    print!("{}", render_structured(format, data)?);
    Ok(())
}
