//! Resource type aliases accepted by the `ops` commands.

/// Short and singular resource names mapped to their canonical plural form.
const RESOURCE_ALIASES: &[(&str, &str)] = &[
    ("hc", "hostedclusters"),
    ("np", "nodepools"),
    ("hcp", "hostedcontrolplanes"),
    ("deploy", "deployments"),
    ("sts", "statefulsets"),
    ("rs", "replicasets"),
    ("ds", "daemonsets"),
    ("svc", "services"),
    ("cm", "configmaps"),
    ("ep", "endpoints"),
    ("ns", "namespaces"),
    ("pvc", "persistentvolumeclaims"),
    ("pv", "persistentvolumes"),
    ("sa", "serviceaccounts"),
    ("po", "pods"),
    ("ev", "events"),
    ("no", "nodes"),
    ("pod", "pods"),
    ("deployment", "deployments"),
    ("statefulset", "statefulsets"),
    ("replicaset", "replicasets"),
    ("daemonset", "daemonsets"),
    ("service", "services"),
    ("configmap", "configmaps"),
    ("endpoint", "endpoints"),
    ("namespace", "namespaces"),
    ("node", "nodes"),
    ("event", "events"),
    ("serviceaccount", "serviceaccounts"),
    ("hostedcluster", "hostedclusters"),
    ("nodepool", "nodepools"),
    ("hostedcontrolplane", "hostedcontrolplanes"),
    ("persistentvolumeclaim", "persistentvolumeclaims"),
    ("persistentvolume", "persistentvolumes"),
];

/// Canonical resource type for `name`. Unknown names pass through unchanged.
pub fn canonical_resource_type(name: &str) -> &str {
    RESOURCE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}
