//! Callback Subsystem.
//!
//! Lists the pending callbacks of an execution and fires them over the
//! callback REST surface using the same ambient credentials as the
//! execution client.

use std::time::Instant;

use async_trait::async_trait;
use gcphcp_types::{CallbackDescriptor, ExecutionHandle};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::classify::{classify, classify_response, classify_transport};
use crate::config::validate_base_url;
use crate::error::WorkflowError;
use crate::gateway::{CallbackGateway, WorkflowsClient, send_json};
use crate::wire::CallbacksResponse;

const TRIGGER_ACTION: &str = "triggering callback";

#[async_trait]
impl CallbackGateway for WorkflowsClient {
    async fn list_callbacks(&self, handle: &ExecutionHandle) -> Result<Vec<CallbackDescriptor>, WorkflowError> {
        let action = "listing callbacks";
        let base = self.config.executions_base_url.trim_end_matches('/');
        let url = format!("{base}/{}/callbacks", handle.resource_name());
        let response: CallbacksResponse = send_json(self.callbacks_http.get(&url), action).await?;

        let callbacks: Vec<CallbackDescriptor> = response
            .callbacks
            .into_iter()
            .map(|callback| callback.into_descriptor(base))
            .collect();
        debug!(execution = %handle, count = callbacks.len(), "callbacks listed");
        Ok(callbacks)
    }

    async fn trigger_callback(&self, url: &str, method: &str, payload: Option<&Value>) -> Result<(), WorkflowError> {
        validate_base_url(url)?;
        let method = parse_method(method)?;

        let mut request = self.callbacks_http.request(method.clone(), url);
        if let Some(body) = payload.filter(|value| !value.is_null()) {
            let encoded = serde_json::to_vec(body).map_err(|error| WorkflowError::encoding("callback payload", error))?;
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(encoded);
        }

        let started = Instant::now();
        let response = request.send().await.map_err(|error| {
            warn!(%method, error = %error, "callback trigger failed before a response");
            classify_transport(TRIGGER_ACTION, &error)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text().await);
            warn!(
                %method,
                status = %status,
                duration_ms = started.elapsed().as_millis(),
                "callback trigger returned an error status"
            );
            return Err(classify_response(TRIGGER_ACTION, status.as_u16(), &body).into());
        }

        debug!(%method, status = %status, duration_ms = started.elapsed().as_millis(), "callback triggered");
        Ok(())
    }
}

/// Body of a failed response. A body that cannot be read is replaced by a
/// marker so the status still reaches the caller.
fn error_body(body: Result<String, reqwest::Error>) -> String {
    body.unwrap_or_else(|error| format!("<response body unreadable: {error}>"))
}

fn parse_method(method: &str) -> Result<Method, WorkflowError> {
    let method = method.trim();
    if method.is_empty() {
        return Ok(Method::POST);
    }
    Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| classify(TRIGGER_ACTION, &format!("unsupported callback method '{method}'")).into())
}
