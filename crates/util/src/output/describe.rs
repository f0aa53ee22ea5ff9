//! Text rendering for the results of the `describe` workflow.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::resources::event_timestamp;
use super::{Table, child, field, items};
use crate::time_format::age_at;

const LABEL_WIDTH: usize = 19;
const MAX_CONDITION_MESSAGE: usize = 50;
const MAX_EVENT_MESSAGE: usize = 70;

/// Render a `describe` result (`resource`, `conditions`, `events`) as text.
///
/// Returns `None` when the result carries no `resource` object.
pub fn render_describe(result: &Value, now: DateTime<Utc>) -> Option<String> {
    let resource = result.get("resource").filter(|resource| resource.is_object())?;
    let metadata = child(resource, "metadata");
    let spec = child(resource, "spec");
    let status = child(resource, "status");
    let is_pod = !items(spec, "containers").is_empty();

    let mut out = String::new();
    line(&mut out, "Name:", &field(metadata, "name"));
    let namespace = field(metadata, "namespace");
    if !namespace.is_empty() {
        line(&mut out, "Namespace:", &namespace);
    }

    if is_pod {
        optional_line(&mut out, "Service Account:", &field(spec, "serviceAccountName"));
        optional_line(&mut out, "Node:", &field(spec, "nodeName"));
        optional_line(&mut out, "Start Time:", &field(status, "startTime"));
    } else {
        optional_line(&mut out, "Created:", &field(metadata, "creationTimestamp"));
    }

    write_labels(&mut out, metadata);

    if is_pod {
        line(&mut out, "Status:", &field(status, "phase"));
        optional_line(&mut out, "IP:", &field(status, "podIP"));
        optional_line(&mut out, "Node IP:", &field(status, "hostIP"));
        write_containers(&mut out, spec, status);
    } else {
        optional_line(&mut out, "Status:", &field(status, "phase"));
    }

    write_conditions(&mut out, items(result, "conditions"));
    if let Some(events) = result.get("events") {
        write_events(&mut out, items(events, "items"), now);
    }
    Some(out)
}

fn line(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "{label:<LABEL_WIDTH$}{value}");
}

fn optional_line(out: &mut String, label: &str, value: &str) {
    if !value.is_empty() {
        line(out, label, value);
    }
}

fn write_labels(out: &mut String, metadata: &Value) {
    match metadata.get("labels").and_then(Value::as_object).filter(|labels| !labels.is_empty()) {
        Some(labels) => {
            let mut pairs: Vec<String> = labels
                .iter()
                .map(|(key, value)| match value {
                    Value::String(text) => format!("{key}={text}"),
                    other => format!("{key}={other}"),
                })
                .collect();
            pairs.sort();
            let _ = writeln!(out, "Labels:");
            for pair in pairs {
                line(out, "", &pair);
            }
        }
        None => line(out, "Labels:", "<none>"),
    }
    if let Some(annotations) = metadata.get("annotations").and_then(Value::as_object) {
        line(out, "Annotations:", &annotations.len().to_string());
    }
}

/// Container names, images and readiness. Full per-container state detail is
/// left to the JSON output.
fn write_containers(out: &mut String, spec: &Value, status: &Value) {
    let statuses = items(status, "containerStatuses");
    let _ = writeln!(out, "\nContainers:");
    for container in items(spec, "containers") {
        let name = field(container, "name");
        let image = field(container, "image");
        let image = image.split_once('@').map_or(image.as_str(), |(repository, _)| repository);
        let ready = statuses
            .iter()
            .find(|candidate| field(candidate, "name") == name)
            .map(|candidate| field(candidate, "ready"))
            .filter(|ready| !ready.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        let _ = writeln!(out, "  {name}:");
        let _ = writeln!(out, "    Image:          {image}");
        let _ = writeln!(out, "    Ready:          {ready}");
    }
}

fn write_conditions(out: &mut String, conditions: &[Value]) {
    if conditions.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nConditions:");
    for condition in conditions {
        let mut rendered = format!("  {}: {}", field(condition, "type"), field(condition, "status"));
        let reason = field(condition, "reason");
        if !reason.is_empty() {
            let _ = write!(rendered, " ({reason})");
        }
        let message = field(condition, "message");
        if !message.is_empty() && message.chars().count() < MAX_CONDITION_MESSAGE {
            let _ = write!(rendered, " - {message}");
        }
        let _ = writeln!(out, "{rendered}");
    }
}

fn write_events(out: &mut String, events: &[Value], now: DateTime<Utc>) {
    out.push('\n');
    if events.is_empty() {
        line(out, "Events:", "<none>");
        return;
    }
    let _ = writeln!(out, "Events:");
    let mut table = Table::new(["AGE", "TYPE", "REASON", "MESSAGE"]);
    for event in events {
        let message: String = field(event, "message").chars().take(MAX_EVENT_MESSAGE).collect();
        table.add_row([
            age_at(&event_timestamp(event), now),
            field(event, "type"),
            field(event, "reason"),
            message,
        ]);
    }
    out.push_str(&table.render());
}
