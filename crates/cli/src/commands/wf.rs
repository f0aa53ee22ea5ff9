//! Direct workflow management: run, list, status and resume.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Subcommand;
use gcphcp_api::{CallbackGateway, ExecutionGateway, WorkflowsClient, parse_argument};
use gcphcp_engine::{ExecutionStatus, ExecutionTracker, execution_status, resume_execution};
use gcphcp_types::{ExecutionHandle, ExecutionRecord, ExecutionState};
use gcphcp_util::{OutputFormat, format_elapsed, redact_sensitive};

use super::{finish_wait, print_detach_hint, print_structured};
use crate::duration::parse_duration;
use crate::render::{executions_table, status_command, status_text, status_value, workflows_table};
use crate::session::Session;

#[derive(Debug, Subcommand)]
pub enum WfCommand {
    /// Execute a workflow and wait for its result
    Run {
        workflow: String,
        /// JSON data to pass as workflow arguments
        #[arg(long)]
        data: Option<String>,
        /// Start the workflow and return without waiting
        #[arg(long = "async")]
        no_wait: bool,
        /// Maximum time to wait for workflow completion
        #[arg(long, default_value = "5m", value_parser = parse_duration)]
        timeout: Duration,
    },

    /// List deployed workflows, or recent executions of one workflow
    List {
        workflow: Option<String>,
        /// Maximum number of executions to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Maximum time to wait
        #[arg(long, default_value = "30s", value_parser = parse_duration)]
        timeout: Duration,
    },

    /// Show the status of an execution
    Status {
        workflow: String,
        execution_id: String,
        /// Wait for the execution to complete
        #[arg(long)]
        wait: bool,
        /// Maximum time to wait
        #[arg(long, default_value = "5m", value_parser = parse_duration)]
        timeout: Duration,
    },

    /// Resume an execution paused on a callback
    Resume {
        workflow: String,
        execution_id: String,
        /// JSON data to send with the callback
        #[arg(long)]
        data: Option<String>,
        /// Wait for the execution to complete after resuming
        #[arg(long)]
        wait: bool,
        /// Maximum time to wait
        #[arg(long, default_value = "5m", value_parser = parse_duration)]
        timeout: Duration,
    },
}

pub async fn run(command: WfCommand, session: &Session) -> Result<()> {
    let client = session.connect().await?;
    let result = match command {
        WfCommand::Run {
            workflow,
            data,
            no_wait,
            timeout,
        } => start(session, &client, &workflow, data.as_deref(), no_wait, timeout).await,
        WfCommand::List {
            workflow,
            limit,
            timeout,
        } => list(session, &client, workflow.as_deref(), limit, timeout).await,
        WfCommand::Status {
            workflow,
            execution_id,
            wait,
            timeout,
        } => {
            let handle = client.scope().execution(workflow, execution_id);
            status(session, &client, &handle, wait, timeout).await
        }
        WfCommand::Resume {
            workflow,
            execution_id,
            data,
            wait,
            timeout,
        } => {
            let handle = client.scope().execution(workflow, execution_id);
            resume(session, &client, &handle, data.as_deref(), wait, timeout).await
        }
    };
    client.close();
    result
}

async fn start(
    session: &Session,
    client: &WorkflowsClient,
    workflow: &str,
    data: Option<&str>,
    no_wait: bool,
    timeout: Duration,
) -> Result<()> {
    let argument = parse_argument(data.unwrap_or_default()).context("invalid --data JSON")?;

    eprintln!("Executing workflow: {workflow}");
    let handle = client.create_execution(workflow, &argument).await?;
    eprintln!("Execution: {}", handle.id());

    if no_wait {
        eprintln!("Workflow started. Check status with:\n  {}", status_command(&handle));
        return Ok(());
    }

    eprintln!("Waiting for completion... (Ctrl+C to detach)");
    let wait = ExecutionTracker::new(client)
        .wait_for_completion(&handle, &session.wait_control(timeout))
        .await;
    let record = finish_wait(&handle, wait)?;
    let duration = record.duration().map(format_elapsed).unwrap_or_default();
    eprintln!("State: {}  Duration: {duration}", record.state);

    match record.state {
        ExecutionState::Succeeded => {
            let result = record.result.unwrap_or_default();
            let format = match session.output {
                OutputFormat::Yaml => OutputFormat::Yaml,
                _ => OutputFormat::Json,
            };
            print_structured(format, &result)
        }
        state => {
            let error = record.failure_context.unwrap_or_default();
            eprintln!("Error: {}", redact_sensitive(&error));
            anyhow::bail!("workflow ended in state {state}")
        }
    }
}

async fn list(
    session: &Session,
    client: &WorkflowsClient,
    workflow: Option<&str>,
    limit: usize,
    timeout: Duration,
) -> Result<()> {
    match workflow {
        None => {
            let workflows = within(timeout, "listing workflows", client.list_workflows()).await?;
            if session.output.is_structured() {
                return print_structured(session.output, &workflows);
            }
            print!("{}", workflows_table(&workflows));
        }
        Some(workflow) => {
            let records = within(timeout, "listing executions", client.list_executions(workflow, limit)).await?;
            if session.output.is_structured() {
                return print_structured(session.output, &records);
            }
            print!("{}", executions_table(&records, workflow, Utc::now()));
        }
    }
    Ok(())
}

async fn status(
    session: &Session,
    client: &WorkflowsClient,
    handle: &ExecutionHandle,
    wait: bool,
    timeout: Duration,
) -> Result<()> {
    let status = if wait {
        eprintln!("Waiting for execution {} to complete...", handle.id());
        let record = wait_for(session, client, handle, timeout).await?;
        ExecutionStatus {
            record,
            callbacks: Vec::new(),
        }
    } else {
        execution_status(client, handle).await?
    };
    print_status(session, &status)
}

async fn resume<G>(
    session: &Session,
    gateway: &G,
    handle: &ExecutionHandle,
    data: Option<&str>,
    wait: bool,
    timeout: Duration,
) -> Result<()>
where
    G: ExecutionGateway + CallbackGateway,
{
    let payload = match data.map(str::trim).filter(|data| !data.is_empty()) {
        Some(data) => Some(parse_argument(data).context("parsing --data as JSON")?),
        None => None,
    };

    let control = session.wait_control(timeout);
    if wait {
        eprintln!("Waiting for execution to complete after resuming...");
    }
    let outcome = resume_execution(gateway, handle, payload.as_ref(), wait.then_some(&control))
        .await
        .map_err(|error| {
            if error.is_cancellation() {
                print_detach_hint(handle);
            }
            anyhow::Error::new(error).context("resuming execution")
        })?;
    eprintln!(
        "Triggered callback: {} {}\nCallback triggered. Workflow resuming.",
        outcome.callback.method, outcome.callback.url
    );

    match outcome.record {
        Some(record) => print_status(
            session,
            &ExecutionStatus {
                record,
                callbacks: Vec::new(),
            },
        ),
        None => {
            eprintln!("\nCheck progress with:\n  {}", status_command(handle));
            Ok(())
        }
    }
}

async fn wait_for(
    session: &Session,
    client: &WorkflowsClient,
    handle: &ExecutionHandle,
    timeout: Duration,
) -> Result<ExecutionRecord> {
    let wait = ExecutionTracker::new(client)
        .wait_for_completion(handle, &session.wait_control(timeout))
        .await;
    finish_wait(handle, wait)
}

/// Bound a single listing call by `--timeout`.
async fn within<T, E>(timeout: Duration, action: &str, call: impl Future<Output = Result<T, E>>) -> Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => Ok(result?),
        Err(_) => anyhow::bail!("{action}: timed out after {timeout:?}"),
    }
}

fn print_status(session: &Session, status: &ExecutionStatus) -> Result<()> {
    if session.output.is_structured() {
        return print_structured(session.output, &status_value(status));
    }
    print!("{}", status_text(status, Utc::now()));
    Ok(())
}
