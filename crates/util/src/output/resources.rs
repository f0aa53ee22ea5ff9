//! kubectl-style tables for the results of the `get` workflow.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{Table, child, condition_status, field, int_field, items};
use crate::time_format::age_at;

const NODE_ROLE_PREFIX: &str = "node-role.kubernetes.io/";
const MAX_VERSION_WIDTH: usize = 40;

/// Render a `get` result as a table for `resource_type`.
///
/// The result is either a list (`items`) or a single object (`resource`).
/// Anything else is returned as `None` so the caller can fall back to JSON.
pub fn render_resource_table(result: &Value, resource_type: &str, now: DateTime<Utc>) -> Option<String> {
    let resources: Vec<&Value> = match (result.get("items").and_then(Value::as_array), result.get("resource")) {
        (Some(list), _) => list.iter().collect(),
        (None, Some(resource)) if resource.is_object() => vec![resource],
        _ => return None,
    };

    if resources.is_empty() {
        return Some(format!("No {resource_type} found.\n"));
    }

    let age = |resource: &Value| age_at(&field(child(resource, "metadata"), "creationTimestamp"), now);
    let rendered = match resource_type {
        "pods" => pods_table(&resources, age),
        "deployments" => deployments_table(&resources, age),
        "hostedclusters" => hosted_clusters_table(&resources, age),
        "services" | "svc" => services_table(&resources, age),
        "namespaces" | "ns" => namespaces_table(&resources, age),
        "nodes" => nodes_table(&resources, age),
        "events" | "ev" => events_table(&resources, now),
        "configmaps" | "cm" => config_maps_table(&resources, age),
        _ => generic_table(&resources, resource_type, age),
    };
    Some(rendered)
}

fn pods_table(resources: &[&Value], age: impl Fn(&Value) -> String) -> String {
    let mut table = Table::new(["NAMESPACE", "NAME", "READY", "STATUS", "RESTARTS", "AGE"]);
    for &pod in resources {
        let metadata = child(pod, "metadata");
        let status = child(pod, "status");
        let containers = items(status, "containerStatuses");
        let ready = containers
            .iter()
            .filter(|container| container.get("ready").and_then(Value::as_bool).unwrap_or(false))
            .count();
        let restarts: i64 = containers.iter().map(|container| int_field(container, "restartCount")).sum();

        table.add_row([
            field(metadata, "namespace"),
            field(metadata, "name"),
            format!("{ready}/{}", containers.len()),
            pod_status(status),
            restarts.to_string(),
            age(pod),
        ]);
    }
    table.render()
}

/// Effective pod status: a waiting/terminated container reason wins over the
/// phase, and init containers are reported while regular ones have no status.
fn pod_status(status: &Value) -> String {
    let phase = field(status, "phase");
    let containers = items(status, "containerStatuses");

    if containers.is_empty() {
        let init_containers = items(status, "initContainerStatuses");
        for (index, init) in init_containers.iter().enumerate() {
            let state = child(init, "state");
            if let Some(waiting) = state.get("waiting").filter(|waiting| non_empty_object(waiting)) {
                let reason = field(waiting, "reason");
                return if reason.is_empty() {
                    format!("Init:{index}/{}", init_containers.len())
                } else {
                    format!("Init:{reason}")
                };
            }
            if let Some(terminated) = state.get("terminated").filter(|terminated| non_empty_object(terminated))
                && int_field(terminated, "exitCode") != 0
            {
                return "Init:Error".to_string();
            }
        }
        return phase;
    }

    for container in containers {
        let state = child(container, "state");
        for key in ["waiting", "terminated"] {
            let reason = field(child(state, key), "reason");
            if !reason.is_empty() {
                return reason;
            }
        }
    }
    phase
}

fn deployments_table(resources: &[&Value], age: impl Fn(&Value) -> String) -> String {
    let mut table = Table::new(["NAMESPACE", "NAME", "READY", "UP-TO-DATE", "AVAILABLE", "AGE"]);
    for &deployment in resources {
        let metadata = child(deployment, "metadata");
        let status = child(deployment, "status");
        table.add_row([
            field(metadata, "namespace"),
            field(metadata, "name"),
            format!("{}/{}", int_field(status, "readyReplicas"), int_field(child(deployment, "spec"), "replicas")),
            int_field(status, "updatedReplicas").to_string(),
            int_field(status, "availableReplicas").to_string(),
            age(deployment),
        ]);
    }
    table.render()
}

fn hosted_clusters_table(resources: &[&Value], age: impl Fn(&Value) -> String) -> String {
    let mut table = Table::new(["NAMESPACE", "NAME", "VERSION", "PROGRESS", "AVAILABLE", "AGE"]);
    for &cluster in resources {
        let metadata = child(cluster, "metadata");
        let status = child(cluster, "status");
        let image = field(child(child(cluster, "spec"), "release"), "image");
        let version = if image.is_empty() {
            "<none>".to_string()
        } else if image.chars().count() > MAX_VERSION_WIDTH {
            format!("{}...", image.chars().take(MAX_VERSION_WIDTH).collect::<String>())
        } else {
            image
        };

        table.add_row([
            field(metadata, "namespace"),
            field(metadata, "name"),
            version,
            field(status, "progress"),
            condition_status(status, "Available"),
            age(cluster),
        ]);
    }
    table.render()
}

fn services_table(resources: &[&Value], age: impl Fn(&Value) -> String) -> String {
    let mut table = Table::new(["NAMESPACE", "NAME", "TYPE", "CLUSTER-IP", "AGE"]);
    for &service in resources {
        let metadata = child(service, "metadata");
        let spec = child(service, "spec");
        table.add_row([
            field(metadata, "namespace"),
            field(metadata, "name"),
            field(spec, "type"),
            field(spec, "clusterIP"),
            age(service),
        ]);
    }
    table.render()
}

fn config_maps_table(resources: &[&Value], age: impl Fn(&Value) -> String) -> String {
    let mut table = Table::new(["NAMESPACE", "NAME", "DATA", "AGE"]);
    for &config_map in resources {
        let metadata = child(config_map, "metadata");
        let entries = config_map.get("data").and_then(Value::as_object).map_or(0, |data| data.len());
        table.add_row([
            field(metadata, "namespace"),
            field(metadata, "name"),
            entries.to_string(),
            age(config_map),
        ]);
    }
    table.render()
}

fn namespaces_table(resources: &[&Value], age: impl Fn(&Value) -> String) -> String {
    let mut table = Table::new(["NAME", "STATUS", "AGE"]);
    for &namespace in resources {
        table.add_row([
            field(child(namespace, "metadata"), "name"),
            field(child(namespace, "status"), "phase"),
            age(namespace),
        ]);
    }
    table.render()
}

fn nodes_table(resources: &[&Value], age: impl Fn(&Value) -> String) -> String {
    let mut table = Table::new(["NAME", "STATUS", "ROLES", "AGE", "VERSION"]);
    for &node in resources {
        let metadata = child(node, "metadata");
        let status = child(node, "status");
        let ready = if condition_status(status, "Ready") == "True" { "Ready" } else { "NotReady" };
        table.add_row([
            field(metadata, "name"),
            ready.to_string(),
            node_roles(child(metadata, "labels")),
            age(node),
            field(child(status, "nodeInfo"), "kubeletVersion"),
        ]);
    }
    table.render()
}

fn node_roles(labels: &Value) -> String {
    let mut roles: Vec<&str> = labels
        .as_object()
        .into_iter()
        .flat_map(|labels| labels.keys())
        .filter_map(|key| key.strip_prefix(NODE_ROLE_PREFIX))
        .filter(|role| !role.is_empty())
        .collect();
    if roles.is_empty() {
        return "<none>".to_string();
    }
    roles.sort_unstable();
    roles.join(",")
}

fn events_table(resources: &[&Value], now: DateTime<Utc>) -> String {
    let mut table = Table::new(["LAST SEEN", "TYPE", "REASON", "OBJECT", "MESSAGE"]);
    for &event in resources {
        let involved = child(event, "involvedObject");
        table.add_row([
            age_at(&event_timestamp(event), now),
            field(event, "type"),
            field(event, "reason"),
            format!("{}/{}", field(involved, "kind"), field(involved, "name")),
            field(event, "message"),
        ]);
    }
    table.render()
}

/// `lastTimestamp`, falling back to `eventTime` for events that only carry the latter.
pub(crate) fn event_timestamp(event: &Value) -> String {
    let last = field(event, "lastTimestamp");
    if last.is_empty() { field(event, "eventTime") } else { last }
}

fn generic_table(resources: &[&Value], resource_type: &str, age: impl Fn(&Value) -> String) -> String {
    let cluster_scoped = resources
        .iter()
        .all(|resource| field(child(resource, "metadata"), "namespace").is_empty());

    let mut table = if cluster_scoped {
        Table::new(["NAME", "AGE"])
    } else {
        Table::new(["NAMESPACE", "NAME", "AGE"])
    };
    for &resource in resources {
        let metadata = child(resource, "metadata");
        if cluster_scoped {
            table.add_row([field(metadata, "name"), age(resource)]);
        } else {
            table.add_row([field(metadata, "namespace"), field(metadata, "name"), age(resource)]);
        }
    }

    format!("{}\n{} {resource_type} found.\n", table.render(), resources.len())
}

fn non_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(|object| !object.is_empty())
}
