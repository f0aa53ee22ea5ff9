//! Output formatting for command results.
//!
//! Renderers return `String`s so callers decide where output goes; the CLI
//! writes results to stdout and progress to stderr.

mod describe;
mod resources;
mod table;

pub use describe::render_describe;
pub use resources::render_resource_table;
pub use table::Table;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("rendering JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rendering YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Output format selected with `-o/--output`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    /// Parse a format name. Unrecognised names fall back to text.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            _ => Self::Text,
        }
    }

    pub fn is_structured(self) -> bool {
        !matches!(self, Self::Text)
    }
}

/// Serialize `data` as indented JSON or YAML. Text falls back to JSON, which
/// is how raw workflow results are shown.
pub fn render_structured<T: Serialize + ?Sized>(format: OutputFormat, data: &T) -> Result<String, RenderError> {
    match format {
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputFormat::Json | OutputFormat::Text => {
            let mut text = serde_json::to_string_pretty(data)?;
            text.push('\n');
            Ok(text)
        }
    }
}

/// Field of a JSON object rendered for display: strings as-is, missing and
/// null values as empty, everything else in JSON notation.
pub fn field(value: &Value, key: &str) -> String {
    match value.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Nested object lookup; missing or non-object values yield `Value::Null`.
pub fn child<'a>(value: &'a Value, key: &str) -> &'a Value {
    value.get(key).unwrap_or(&Value::Null)
}

/// Array field as a slice; missing or non-array values are empty.
pub fn items<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}

pub(crate) fn int_field(value: &Value, key: &str) -> i64 {
    value
        .get(key)
        .and_then(|number| number.as_i64().or_else(|| number.as_f64().map(|float| float as i64)))
        .unwrap_or(0)
}

/// Status of the condition of type `kind`, or `Unknown`.
pub(crate) fn condition_status(status: &Value, kind: &str) -> String {
    items(status, "conditions")
        .iter()
        .find(|condition| field(condition, "type") == kind)
        .map(|condition| field(condition, "status"))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// One-line summary of a workflow result: resource type, names, namespace,
/// item count and log line count when present.
pub fn result_summary(result: &Value) -> String {
    let mut parts = Vec::new();
    for key in ["resource_type", "pod", "name"] {
        if let Some(text) = result.get(key).and_then(Value::as_str).filter(|text| !text.is_empty()) {
            parts.push(text.to_string());
        }
    }
    if let Some(namespace) = result.get("namespace").and_then(Value::as_str).filter(|ns| !ns.is_empty()) {
        parts.push(format!("-n {namespace}"));
    }
    if let Some(count) = result.get("count") {
        parts.push(format!("({count} items)"));
    }
    if let Some(logs) = result.get("logs").and_then(Value::as_str) {
        parts.push(format!("({} lines)", logs.matches('\n').count()));
    }

    if parts.is_empty() { "ok".to_string() } else { parts.join(" ") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_names_parse_case_insensitively() {
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Yaml);
        assert_eq!(OutputFormat::parse("table"), OutputFormat::Text);
    }

    #[test]
    fn structured_rendering() {
        let data = json!({ "items": [] });
        assert_eq!(render_structured(OutputFormat::Json, &data).expect("json"), "{\n  \"items\": []\n}\n");
        assert_eq!(render_structured(OutputFormat::Yaml, &data).expect("yaml"), "items: []\n");
    }

    #[test]
    fn fields_render_for_display() {
        let value = json!({ "name": "etcd-0", "replicas": 3, "missing": null });
        assert_eq!(field(&value, "name"), "etcd-0");
        assert_eq!(field(&value, "replicas"), "3");
        assert_eq!(field(&value, "missing"), "");
        assert_eq!(field(&value, "absent"), "");
    }

    #[test]
    fn summaries_mention_what_was_returned() {
        let result = json!({ "resource_type": "pods", "namespace": "hypershift", "count": 4 });
        assert_eq!(result_summary(&result), "pods -n hypershift (4 items)");
        assert_eq!(result_summary(&json!({ "pod": "etcd-0", "logs": "a\nb\n" })), "etcd-0 (2 lines)");
        assert_eq!(result_summary(&json!({})), "ok");
    }
}
