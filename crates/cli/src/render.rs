//! Text and structured views of execution status and workflow listings.

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use gcphcp_engine::ExecutionStatus;
use gcphcp_types::{ExecutionHandle, ExecutionRecord, ExecutionState, WorkflowDescriptor};
use gcphcp_util::output::result_summary;
use gcphcp_util::{Table, format_duration, format_elapsed, format_timestamp};
use serde_json::{Value, json};

pub fn status_command(handle: &ExecutionHandle) -> String {
    format!("gcphcp ops wf status {} {}", handle.workflow(), handle.id())
}

/// Human-readable execution status, including how to resume a paused
/// execution.
pub fn status_text(status: &ExecutionStatus, now: DateTime<Utc>) -> String {
    let record = &status.record;
    let mut out = String::new();
    let _ = writeln!(out, "Workflow:   {}", record.handle.workflow());
    let _ = writeln!(out, "State:      {}", status.state_label());
    let _ = writeln!(
        out,
        "Started:    {} ({} ago)",
        format_timestamp(record.start_time),
        format_duration(now - record.start_time)
    );
    if let (Some(end_time), Some(duration)) = (record.end_time, record.duration()) {
        let _ = writeln!(out, "Ended:      {}", format_timestamp(end_time));
        let _ = writeln!(out, "Duration:   {}", format_elapsed(duration));
    }
    if let Some(error) = record.failure_context.as_deref().filter(|error| !error.is_empty()) {
        let _ = writeln!(out, "Error:      {error}");
    }
    if let (ExecutionState::Succeeded, Some(result)) = (record.state, &record.result) {
        let _ = writeln!(out, "Args:       {}", result_summary(result));
    }

    if !status.callbacks.is_empty() {
        let _ = writeln!(out, "\nCallbacks:");
        for callback in &status.callbacks {
            let _ = writeln!(out, "  {} {}", callback.method, callback.url);
        }
        let _ = writeln!(out, "\nResume with:");
        let _ = writeln!(
            out,
            "  gcphcp ops wf resume {} {} --data '{{\"approved\": true}}'",
            record.handle.workflow(),
            record.handle.id()
        );
    }

    if matches!(record.state, ExecutionState::Succeeded | ExecutionState::Failed) {
        let _ = writeln!(out, "\nUse -o json for full result.");
    }
    out
}

/// Structured status for `-o json|yaml`.
pub fn status_value(status: &ExecutionStatus) -> Value {
    let record = &status.record;
    let mut value = json!({
        "execution": record.handle.resource_name(),
        "state": record.state,
        "start_time": record.start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
        "end_time": record.end_time.map(|time| time.to_rfc3339_opts(SecondsFormat::Secs, true)),
        "duration": record.duration().map(format_elapsed),
        "error": record.failure_context,
        "result": record.result,
    });
    if !status.callbacks.is_empty() {
        value["callbacks"] = json!(status.callbacks);
    }
    value
}

pub fn workflows_table(workflows: &[WorkflowDescriptor]) -> String {
    if workflows.is_empty() {
        return "No workflows found.\n".to_string();
    }
    let mut table = Table::new(["NAME", "STATE", "REVISION", "UPDATED"]);
    for workflow in workflows {
        table.add_row([
            workflow.name.clone(),
            workflow.state.to_string(),
            workflow.revision_id.clone(),
            workflow
                .update_time
                .map(|time| time.to_rfc3339_opts(SecondsFormat::Secs, true))
                .unwrap_or_default(),
        ]);
    }
    table.render()
}

pub fn executions_table(records: &[ExecutionRecord], workflow: &str, now: DateTime<Utc>) -> String {
    if records.is_empty() {
        return format!("No executions found for workflow '{workflow}'.\n");
    }
    let mut table = Table::new(["ID", "STATE", "STARTED", "DURATION"]);
    for record in records {
        table.add_row([
            record.handle.id().to_string(),
            record.state.to_string(),
            format!("{} ago", format_duration(now - record.start_time)),
            record.duration().map(format_elapsed).unwrap_or_else(|| "running".to_string()),
        ]);
    }
    table.render()
}
