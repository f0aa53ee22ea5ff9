//! Remote Workflow Gateway.
//!
//! [`WorkflowsClient`] wraps the two remote surfaces the tool talks to: the
//! execution management API (create/get/list executions, list workflows)
//! and the callback REST surface (see [`crate::callbacks`]). Each surface gets
//! its own `reqwest::Client`, built once in [`WorkflowsClient::connect`] and
//! released together by [`WorkflowsClient::close`] or on drop.
//!
//! The engine depends on the [`ExecutionGateway`] and [`CallbackGateway`]
//! traits rather than on the concrete client, so the polling and resume
//! logic is exercised in tests without a network.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use gcphcp_types::{CallbackDescriptor, ExecutionHandle, ExecutionRecord, WorkflowDescriptor, WorkflowScope};
use reqwest::{Client, Method, RequestBuilder, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::classify::{classify, classify_response, classify_transport};
use crate::config::GatewayConfig;
use crate::credentials::resolve_access_token;
use crate::error::WorkflowError;
use crate::wire::{CreateExecutionRequest, ExecutionResource, ListExecutionsResponse, ListWorkflowsResponse};

/// Execution management operations.
#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    /// Scope every workflow name is resolved against.
    fn scope(&self) -> &WorkflowScope;

    /// Start an execution of `workflow` with `argument`. This starts real work.
    async fn create_execution(&self, workflow: &str, argument: &Value) -> Result<ExecutionHandle, WorkflowError>;

    /// Single point-in-time read of an execution.
    async fn get_execution(&self, handle: &ExecutionHandle) -> Result<ExecutionRecord, WorkflowError>;

    /// Most recent executions of `workflow`, newest first, at most `limit`.
    async fn list_executions(&self, workflow: &str, limit: usize) -> Result<Vec<ExecutionRecord>, WorkflowError>;

    /// Workflows deployed in the scope, in service order.
    async fn list_workflows(&self) -> Result<Vec<WorkflowDescriptor>, WorkflowError>;
}

/// Callback discovery and trigger operations.
#[async_trait]
pub trait CallbackGateway: Send + Sync {
    /// Pending callbacks of an execution; empty when none are pending.
    async fn list_callbacks(&self, handle: &ExecutionHandle) -> Result<Vec<CallbackDescriptor>, WorkflowError>;

    /// Fire one callback. `method` defaults to POST when empty; `payload` is
    /// sent as a JSON body unless it is absent or null.
    async fn trigger_callback(&self, url: &str, method: &str, payload: Option<&Value>) -> Result<(), WorkflowError>;
}

/// Client for the Cloud Workflows REST surfaces of one project/region.
#[derive(Debug)]
pub struct WorkflowsClient {
    pub(crate) config: GatewayConfig,
    pub(crate) executions_http: Client,
    pub(crate) callbacks_http: Client,
}

impl WorkflowsClient {
    /// Validate `config`, resolve credentials and build both transport clients.
    pub async fn connect(config: &GatewayConfig) -> Result<Self, WorkflowError> {
        config.validate()?;
        let token = resolve_access_token(config.access_token.as_deref()).await?;
        Self::with_token(config, &token)
    }

    /// Build the client around an already-resolved bearer token.
    pub fn with_token(config: &GatewayConfig, token: &str) -> Result<Self, WorkflowError> {
        config.validate()?;
        let executions_http = build_http_client(token, config.request_timeout)?;
        let callbacks_http = build_http_client(token, config.request_timeout)?;
        debug!(
            project = %config.scope.project,
            region = %config.scope.region,
            executions_base = %config.executions_base_url,
            workflows_base = %config.workflows_base_url,
            "workflows client ready"
        );
        Ok(Self {
            config: config.clone(),
            executions_http,
            callbacks_http,
        })
    }

    /// Release both transport clients.
    pub fn close(self) {
        debug!(project = %self.config.scope.project, "closing workflows client");
        drop(self.executions_http);
        drop(self.callbacks_http);
    }

    fn executions_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.executions_base_url.trim_end_matches('/'), path)
    }

    fn workflows_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.workflows_base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl ExecutionGateway for WorkflowsClient {
    fn scope(&self) -> &WorkflowScope {
        &self.config.scope
    }

    async fn create_execution(&self, workflow: &str, argument: &Value) -> Result<ExecutionHandle, WorkflowError> {
        let action = format!("executing workflow '{workflow}'");
        let argument_text = serde_json::to_string(argument).map_err(|error| WorkflowError::encoding("workflow arguments", error))?;
        let url = self.executions_url(&format!("{}/executions", self.config.scope.workflow_path(workflow)));
        let request = self
            .executions_http
            .request(Method::POST, &url)
            .json(&CreateExecutionRequest { argument: &argument_text });

        let resource: ExecutionResource = send_json(request, &action).await?;
        let handle = ExecutionHandle::parse(&resource.name).map_err(|error| classify(&action, &error.to_string()))?;
        debug!(execution = %handle, "execution created");
        Ok(handle)
    }

    async fn get_execution(&self, handle: &ExecutionHandle) -> Result<ExecutionRecord, WorkflowError> {
        let action = "getting execution status";
        let request = self.executions_http.get(self.executions_url(&handle.resource_name()));
        let resource: ExecutionResource = send_json(request, action).await?;
        let record = resource.into_record().map_err(|message| classify(action, &message))?;
        debug!(execution = %handle, state = %record.state, "execution read");
        Ok(record)
    }

    async fn list_executions(&self, workflow: &str, limit: usize) -> Result<Vec<ExecutionRecord>, WorkflowError> {
        let action = format!("listing executions for '{workflow}'");
        let url = self.executions_url(&format!("{}/executions", self.config.scope.workflow_path(workflow)));
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        while records.len() < limit {
            let mut query = vec![("pageSize", limit.to_string())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }
            let request = self.executions_http.get(&url).query(&query);
            let page: ListExecutionsResponse = send_json(request, &action).await?;

            for resource in page.executions {
                if records.len() >= limit {
                    break;
                }
                records.push(resource.into_record().map_err(|message| classify(&action, &message))?);
            }

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(workflow = %workflow, count = records.len(), limit, "executions listed");
        Ok(records)
    }

    async fn list_workflows(&self) -> Result<Vec<WorkflowDescriptor>, WorkflowError> {
        let action = "listing workflows";
        let url = self.workflows_url(&format!("{}/workflows", self.config.scope.parent()));
        let mut descriptors = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.executions_http.get(&url);
            if let Some(token) = page_token.take() {
                request = request.query(&[("pageToken", token)]);
            }
            let page: ListWorkflowsResponse = send_json(request, action).await?;
            descriptors.extend(page.workflows.into_iter().map(|workflow| workflow.into_descriptor()));

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = descriptors.len(), "workflows listed");
        Ok(descriptors)
    }
}

fn build_http_client(token: &str, timeout: Duration) -> Result<Client, WorkflowError> {
    let mut default_headers = header::HeaderMap::new();
    let authorization = header::HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| classify("creating workflows client", "could not find default credentials: access token is not a valid header value"))?;
    default_headers.insert(header::AUTHORIZATION, authorization);
    default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

    Client::builder()
        .default_headers(default_headers)
        .user_agent(format!("gcphcp/{}; {}", env!("CARGO_PKG_VERSION"), std::env::consts::OS))
        .timeout(timeout)
        .build()
        .map_err(|error| classify_transport("creating workflows client", &error).into())
}

/// Send a request and decode a JSON body, classifying every failure.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder, action: &str) -> Result<T, WorkflowError> {
    let started = Instant::now();
    let response = request.send().await.map_err(|error| {
        warn!(action, error = %error, "remote call failed before a response");
        classify_transport(action, &error)
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|error| classify_transport(action, &error))?;
    if !status.is_success() {
        warn!(
            action,
            status = %status,
            duration_ms = started.elapsed().as_millis(),
            "remote call returned an error status"
        );
        return Err(classify_response(action, status.as_u16(), &body).into());
    }

    debug!(action, status = %status, duration_ms = started.elapsed().as_millis(), "remote call completed");
    serde_json::from_str(&body).map_err(|error| classify(action, &format!("decoding response: {error}")).into())
}
