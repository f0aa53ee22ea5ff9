//! REST payloads of the workflow services and their decoding into the
//! shared data model.

use chrono::{DateTime, Utc};
use gcphcp_types::{CallbackDescriptor, ExecutionHandle, ExecutionRecord, ExecutionState, WorkflowDescriptor, WorkflowLifecycle};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Serialize)]
pub(crate) struct CreateExecutionRequest<'a> {
    pub argument: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExecutionResource {
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub argument: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<ExecutionErrorResource>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExecutionErrorResource {
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListExecutionsResponse {
    #[serde(default)]
    pub executions: Vec<ExecutionResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WorkflowResource {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub revision_id: Option<String>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListWorkflowsResponse {
    #[serde(default)]
    pub workflows: Vec<WorkflowResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CallbacksResponse {
    #[serde(default)]
    pub callbacks: Vec<CallbackResource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CallbackResource {
    pub name: String,
    #[serde(default)]
    pub method: String,
}

impl ExecutionResource {
    /// Decode into a record, keeping result, failure context and end time
    /// only for the states they belong to.
    pub fn into_record(self) -> Result<ExecutionRecord, String> {
        let handle = ExecutionHandle::parse(&self.name).map_err(|error| error.to_string())?;
        let state: ExecutionState = self.state.parse().map_err(|error: gcphcp_types::UnknownStateError| error.to_string())?;
        let start_time = self
            .start_time
            .ok_or_else(|| format!("execution {} has no start time", self.name))?;

        let argument = self.argument.as_deref().filter(|text| !text.trim().is_empty()).map(parse_payload);
        let result = match state {
            ExecutionState::Succeeded => Some(parse_payload(self.result.as_deref().unwrap_or("null"))),
            _ => None,
        };
        let failure_context = match state {
            ExecutionState::Failed => self.error.map(|error| {
                error
                    .context
                    .filter(|context| !context.is_empty())
                    .or(error.payload)
                    .unwrap_or_default()
            }),
            _ => None,
        };
        let end_time = if state.is_terminal() { self.end_time } else { None };

        Ok(ExecutionRecord {
            handle,
            state,
            argument,
            result,
            failure_context,
            start_time,
            end_time,
        })
    }
}

impl WorkflowResource {
    pub fn into_descriptor(self) -> WorkflowDescriptor {
        let name = match self.name.rsplit_once("/workflows/") {
            Some((_, short_name)) => short_name.to_string(),
            None => self.name,
        };
        WorkflowDescriptor {
            name,
            state: WorkflowLifecycle::from_api_str(self.state.as_deref().unwrap_or_default()),
            revision_id: self.revision_id.unwrap_or_default(),
            update_time: self.update_time,
        }
    }
}

impl CallbackResource {
    /// Resolve the trigger URL relative to the callbacks base URL.
    pub fn into_descriptor(self, base_url: &str) -> CallbackDescriptor {
        let url = format!("{}/{}", base_url.trim_end_matches('/'), self.name.trim_start_matches('/'));
        CallbackDescriptor {
            name: self.name,
            method: self.method,
            url,
        }
    }
}

/// Parse a JSON text payload; text that is not JSON is kept under `raw`.
pub(crate) fn parse_payload(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}
