//! Scripted in-memory gateway for engine tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use gcphcp_api::{CallbackGateway, ClassifiedError, ExecutionGateway, WorkflowError};
use gcphcp_types::{
    CallbackDescriptor, ExecutionHandle, ExecutionRecord, ExecutionState, WorkflowDescriptor, WorkflowScope,
};
use serde_json::{Value, json};
use tokio::time::Instant;

pub(crate) fn scope() -> WorkflowScope {
    WorkflowScope::new("demo-project", "us-central1")
}

pub(crate) fn handle() -> ExecutionHandle {
    scope().execution("get", "e1")
}

pub(crate) fn record(state: ExecutionState) -> ExecutionRecord {
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let mut record = ExecutionRecord::pending(handle(), state, start);
    if state.is_terminal() {
        record.end_time = Some(start + chrono::TimeDelta::seconds(2));
    }
    if state == ExecutionState::Succeeded {
        record.result = Some(json!({ "items": [] }));
    }
    record
}

#[derive(Default)]
pub(crate) struct ScriptedGateway {
    reads: Mutex<VecDeque<Result<ExecutionState, ClassifiedError>>>,
    repeat_last: Option<ExecutionState>,
    read_times: Mutex<Vec<Instant>>,
    pub created: Mutex<Vec<(String, Value)>>,
    pub callbacks: Mutex<Vec<CallbackDescriptor>>,
    pub callbacks_error: Option<ClassifiedError>,
    pub triggered: Mutex<Vec<(String, String, Option<Value>)>>,
    /// Name the server reports for the execution; callbacks are only found under it.
    server_handle: Option<ExecutionHandle>,
    pub listed_for: Mutex<Vec<ExecutionHandle>>,
}

impl ScriptedGateway {
    pub fn with_states(states: impl IntoIterator<Item = ExecutionState>) -> Self {
        Self::with_results(states.into_iter().map(Ok))
    }

    pub fn with_results(results: impl IntoIterator<Item = Result<ExecutionState, ClassifiedError>>) -> Self {
        Self {
            reads: Mutex::new(results.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn forever(state: ExecutionState) -> Self {
        Self {
            repeat_last: Some(state),
            ..Default::default()
        }
    }

    pub fn with_callbacks(mut self, callbacks: Vec<CallbackDescriptor>) -> Self {
        self.callbacks = Mutex::new(callbacks);
        self
    }

    pub fn with_server_handle(mut self, handle: ExecutionHandle) -> Self {
        self.server_handle = Some(handle);
        self
    }

    fn served(&self, state: ExecutionState) -> ExecutionRecord {
        let mut record = record(state);
        if let Some(handle) = &self.server_handle {
            record.handle = handle.clone();
        }
        record
    }

    pub fn get_calls(&self) -> usize {
        self.read_times.lock().unwrap().len()
    }

    pub fn read_times(&self) -> Vec<Instant> {
        self.read_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExecutionGateway for ScriptedGateway {
    fn scope(&self) -> &WorkflowScope {
        static SCOPE: std::sync::OnceLock<WorkflowScope> = std::sync::OnceLock::new();
        SCOPE.get_or_init(scope)
    }

    async fn create_execution(&self, workflow: &str, argument: &Value) -> Result<ExecutionHandle, WorkflowError> {
        self.created.lock().unwrap().push((workflow.to_string(), argument.clone()));
        Ok(scope().execution(workflow, "e1"))
    }

    async fn get_execution(&self, _handle: &ExecutionHandle) -> Result<ExecutionRecord, WorkflowError> {
        self.read_times.lock().unwrap().push(Instant::now());
        let next = self.reads.lock().unwrap().pop_front();
        match (next, self.repeat_last) {
            (Some(Ok(state)), _) => Ok(self.served(state)),
            (Some(Err(error)), _) => Err(error.into()),
            (None, Some(state)) => Ok(self.served(state)),
            (None, None) => panic!("scripted gateway ran out of reads"),
        }
    }

    async fn list_executions(&self, _workflow: &str, limit: usize) -> Result<Vec<ExecutionRecord>, WorkflowError> {
        Ok(vec![record(ExecutionState::Succeeded)].into_iter().take(limit).collect())
    }

    async fn list_workflows(&self) -> Result<Vec<WorkflowDescriptor>, WorkflowError> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl CallbackGateway for ScriptedGateway {
    async fn list_callbacks(&self, handle: &ExecutionHandle) -> Result<Vec<CallbackDescriptor>, WorkflowError> {
        self.listed_for.lock().unwrap().push(handle.clone());
        if let Some(error) = &self.callbacks_error {
            return Err(error.clone().into());
        }
        if self.server_handle.as_ref().is_some_and(|served| served != handle) {
            return Ok(Vec::new());
        }
        Ok(self.callbacks.lock().unwrap().clone())
    }

    async fn trigger_callback(&self, url: &str, method: &str, payload: Option<&Value>) -> Result<(), WorkflowError> {
        self.triggered
            .lock()
            .unwrap()
            .push((url.to_string(), method.to_string(), payload.cloned()));
        Ok(())
    }
}
