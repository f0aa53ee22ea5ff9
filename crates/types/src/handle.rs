use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Project and region pair that scopes every workflow and execution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowScope {
    pub project: String,
    pub region: String,
}

impl WorkflowScope {
    pub fn new(project: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            region: region.into(),
        }
    }

    /// Parent path used when listing workflows: `projects/{p}/locations/{r}`.
    pub fn parent(&self) -> String {
        format!("projects/{}/locations/{}", self.project, self.region)
    }

    /// Resource path of a named workflow within this scope.
    pub fn workflow_path(&self, workflow: &str) -> String {
        format!("{}/workflows/{}", self.parent(), workflow)
    }

    /// Build a handle for an execution id of `workflow` within this scope.
    pub fn execution(&self, workflow: impl Into<String>, execution_id: impl Into<String>) -> ExecutionHandle {
        ExecutionHandle {
            project: self.project.clone(),
            region: self.region.clone(),
            workflow: workflow.into(),
            execution_id: execution_id.into(),
        }
    }
}

/// Error returned when an execution resource name does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid execution name '{name}': expected projects/<project>/locations/<region>/workflows/<workflow>/executions/<id>")]
pub struct HandleParseError {
    name: String,
}

/// Fully-qualified identifier of a single execution.
///
/// The handle renders to and parses from the resource name
/// `projects/{project}/locations/{region}/workflows/{workflow}/executions/{id}`.
/// The project segment is kept verbatim, so a handle parsed from a
/// server-returned name (which carries the project number) renders back to
/// the exact same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExecutionHandle {
    project: String,
    region: String,
    workflow: String,
    execution_id: String,
}

impl ExecutionHandle {
    /// Parse a full execution resource name.
    pub fn parse(name: &str) -> Result<Self, HandleParseError> {
        let invalid = || HandleParseError { name: name.to_string() };
        let segments: Vec<&str> = name.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            ["projects", project, "locations", region, "workflows", workflow, "executions", execution_id]
                if [project, region, workflow, execution_id].iter().all(|segment| !segment.is_empty()) =>
            {
                Ok(Self {
                    project: project.to_string(),
                    region: region.to_string(),
                    workflow: workflow.to_string(),
                    execution_id: execution_id.to_string(),
                })
            }
            _ => Err(invalid()),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn workflow(&self) -> &str {
        &self.workflow
    }

    /// Short execution id (the last path segment).
    pub fn id(&self) -> &str {
        &self.execution_id
    }

    pub fn resource_name(&self) -> String {
        format!(
            "projects/{}/locations/{}/workflows/{}/executions/{}",
            self.project, self.region, self.workflow, self.execution_id
        )
    }
}

impl fmt::Display for ExecutionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resource_name())
    }
}

impl FromStr for ExecutionHandle {
    type Err = HandleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ExecutionHandle {
    type Error = HandleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ExecutionHandle> for String {
    fn from(handle: ExecutionHandle) -> Self {
        handle.resource_name()
    }
}
