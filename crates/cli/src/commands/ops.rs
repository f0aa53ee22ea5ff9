//! kubectl-style convenience commands backed by the `get`, `describe` and
//! `logs` workflows.

use std::fmt::Write;
use std::time::Duration;

use anyhow::{Result, bail};
use chrono::Utc;
use clap::Subcommand;
use gcphcp_util::{OutputFormat, canonical_resource_type, render_describe, render_resource_table};
use serde_json::{Map, Value, json};

use super::wf::WfCommand;
use super::{print_structured, run_for_result};
use crate::duration::parse_duration;
use crate::session::Session;

#[derive(Debug, Subcommand)]
pub enum OpsCommand {
    /// Get Kubernetes resources via Cloud Workflows
    Get {
        /// Resource type, e.g. pods, deploy, hc
        resource_type: String,
        /// Resource name
        name: Option<String>,
        /// Kubernetes namespace
        #[arg(short = 'n', long)]
        namespace: Option<String>,
        /// Label selector (e.g. app=nginx)
        #[arg(short = 'l', long)]
        selector: Option<String>,
        /// Maximum time to wait for workflow completion
        #[arg(long, default_value = "2m", value_parser = parse_duration)]
        timeout: Duration,
    },

    /// Describe a Kubernetes resource with events
    Describe {
        resource_type: String,
        name: String,
        /// Kubernetes namespace
        #[arg(short = 'n', long)]
        namespace: Option<String>,
        /// Maximum time to wait for workflow completion
        #[arg(long, default_value = "2m", value_parser = parse_duration)]
        timeout: Duration,
    },

    /// Get pod logs via Cloud Workflows
    Logs {
        pod: String,
        /// Kubernetes namespace
        #[arg(short = 'n', long)]
        namespace: String,
        /// Container name
        #[arg(short = 'c', long)]
        container: Option<String>,
        /// Number of log lines to retrieve
        #[arg(long, default_value_t = 100)]
        tail: u32,
        /// Get logs from the previous container instance
        #[arg(long)]
        previous: bool,
        /// Maximum time to wait for workflow completion
        #[arg(long, default_value = "2m", value_parser = parse_duration)]
        timeout: Duration,
    },

    /// Run, list, inspect and resume workflow executions
    Wf {
        #[command(subcommand)]
        command: WfCommand,
    },
}

pub async fn run(command: OpsCommand, session: &Session) -> Result<()> {
    match command {
        OpsCommand::Get {
            resource_type,
            name,
            namespace,
            selector,
            timeout,
        } => get(session, &resource_type, name, namespace, selector, timeout).await,
        OpsCommand::Describe {
            resource_type,
            name,
            namespace,
            timeout,
        } => describe(session, &resource_type, name, namespace, timeout).await,
        OpsCommand::Logs {
            pod,
            namespace,
            container,
            tail,
            previous,
            timeout,
        } => logs(session, pod, namespace, container, tail, previous, timeout).await,
        OpsCommand::Wf { command } => super::wf::run(command, session).await,
    }
}

async fn get(
    session: &Session,
    resource_type: &str,
    name: Option<String>,
    namespace: Option<String>,
    selector: Option<String>,
    timeout: Duration,
) -> Result<()> {
    let resource_type = canonical_resource_type(resource_type);
    let argument = get_argument(resource_type, name, namespace, selector);
    eprintln!("Getting {}", target_description(&argument));

    let result = run_for_result(session, "get", &argument, timeout).await?;
    if session.output.is_structured() {
        return print_structured(session.output, &result);
    }
    match render_resource_table(&result, resource_type, Utc::now()) {
        Some(table) => print!("{table}"),
        None => print_structured(OutputFormat::Json, &result)?,
    }
    Ok(())
}

async fn describe(
    session: &Session,
    resource_type: &str,
    name: String,
    namespace: Option<String>,
    timeout: Duration,
) -> Result<()> {
    let resource_type = canonical_resource_type(resource_type);
    let argument = get_argument(resource_type, Some(name), namespace, None);
    eprintln!("Describing {}", target_description(&argument));

    let result = run_for_result(session, "describe", &argument, timeout).await?;
    if session.output.is_structured() {
        return print_structured(session.output, &result);
    }
    match render_describe(&result, Utc::now()) {
        Some(text) => print!("{text}"),
        None => print_structured(OutputFormat::Json, &result)?,
    }
    Ok(())
}

async fn logs(
    session: &Session,
    pod: String,
    namespace: String,
    container: Option<String>,
    tail: u32,
    previous: bool,
    timeout: Duration,
) -> Result<()> {
    let mut progress = format!("Getting logs for {pod}");
    if let Some(container) = &container {
        let _ = write!(progress, " (container: {container})");
    }
    eprintln!("{progress} in {namespace}");
    if previous {
        eprintln!("Previous container instance");
    }

    let argument = logs_argument(&pod, &namespace, container, tail, previous);
    let result = run_for_result(session, "logs", &argument, timeout).await?;
    if session.output.is_structured() {
        return print_structured(session.output, &result);
    }

    if let Some(message) = container_required_message(&pod, &namespace, &result) {
        eprint!("{message}");
        bail!("container name required");
    }
    match result.get("logs") {
        Some(Value::String(logs)) => println!("{logs}"),
        Some(other) => println!("{other}"),
        None => print_structured(OutputFormat::Json, &result)?,
    }
    Ok(())
}

/// Argument for the `get` and `describe` workflows. Unset options are left
/// out rather than sent empty.
fn get_argument(
    resource_type: &str,
    name: Option<String>,
    namespace: Option<String>,
    selector: Option<String>,
) -> Value {
    let mut argument = Map::new();
    argument.insert("resource_type".into(), json!(resource_type));
    let optional = [("namespace", namespace), ("name", name), ("label_selector", selector)];
    for (key, value) in optional {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            argument.insert(key.into(), Value::String(value));
        }
    }
    Value::Object(argument)
}

fn logs_argument(pod: &str, namespace: &str, container: Option<String>, tail: u32, previous: bool) -> Value {
    let mut argument = json!({
        "namespace": namespace,
        "pod": pod,
        "tail_lines": tail,
    });
    if let Some(container) = container.filter(|container| !container.is_empty()) {
        argument["container"] = Value::String(container);
    }
    if previous {
        argument["previous"] = Value::Bool(true);
    }
    argument
}

fn target_description(argument: &Value) -> String {
    let text = |key: &str| argument.get(key).and_then(Value::as_str);
    let mut description = text("resource_type").unwrap_or_default().to_string();
    if let Some(name) = text("name") {
        let _ = write!(description, " {name}");
    }
    if let Some(namespace) = text("namespace") {
        let _ = write!(description, " (ns: {namespace})");
    }
    if let Some(selector) = text("label_selector") {
        let _ = write!(description, " (selector: {selector})");
    }
    description
}

/// Guidance printed when the `logs` workflow needs a container name.
fn container_required_message(pod: &str, namespace: &str, result: &Value) -> Option<String> {
    if result.get("status").and_then(Value::as_str) != Some("container_required") {
        return None;
    }
    let mut message = format!("Error: pod \"{pod}\" has multiple containers; you must specify one:\n");
    let containers = result.get("available_containers").and_then(Value::as_array);
    for container in containers.into_iter().flatten() {
        match container {
            Value::String(name) => {
                let _ = writeln!(message, "  - {name}");
            }
            other => {
                let _ = writeln!(message, "  - {other}");
            }
        }
    }
    let _ = writeln!(message, "\nUse: gcphcp ops logs {pod} -n {namespace} -c <container>");
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_argument_omits_unset_options() {
        let argument = get_argument(canonical_resource_type("po"), None, Some("hypershift".into()), None);
        assert_eq!(argument, json!({ "resource_type": "pods", "namespace": "hypershift" }));
        assert_eq!(target_description(&argument), "pods (ns: hypershift)");

        let argument = get_argument("nodes", Some("node-a".into()), None, Some("role=infra".into()));
        assert_eq!(
            argument,
            json!({ "resource_type": "nodes", "name": "node-a", "label_selector": "role=infra" })
        );
        assert_eq!(target_description(&argument), "nodes node-a (selector: role=infra)");
    }

    #[test]
    fn logs_argument_carries_tail_and_flags() {
        assert_eq!(
            logs_argument("etcd-0", "hcp", None, 100, false),
            json!({ "namespace": "hcp", "pod": "etcd-0", "tail_lines": 100 })
        );
        assert_eq!(
            logs_argument("etcd-0", "hcp", Some("etcd".into()), 50, true),
            json!({ "namespace": "hcp", "pod": "etcd-0", "tail_lines": 50, "container": "etcd", "previous": true })
        );
    }

    #[test]
    fn container_required_lists_available_containers() {
        let result = json!({ "status": "container_required", "available_containers": ["etcd", "metrics"] });

        let message = container_required_message("etcd-0", "hcp", &result).expect("required");

        assert_eq!(
            message,
            "Error: pod \"etcd-0\" has multiple containers; you must specify one:\n  - etcd\n  - metrics\n\n\
             Use: gcphcp ops logs etcd-0 -n hcp -c <container>\n"
        );
        assert_eq!(container_required_message("etcd-0", "hcp", &json!({ "logs": "" })), None);
    }
}
