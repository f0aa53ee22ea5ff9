//! Cloud Workflows client for the gcphcp tool.
//!
//! This crate owns everything that crosses the network boundary:
//!
//! - [`WorkflowsClient`], the Remote Workflow Gateway, implementing
//!   [`ExecutionGateway`] and [`CallbackGateway`]
//! - ambient credential discovery ([`resolve_access_token`])
//! - endpoint validation so bearer tokens only reach trusted hosts
//! - failure classification with remediation hints ([`classify`])
//!
//! # Example
//!
//! ```ignore
//! use gcphcp_api::{ExecutionGateway, GatewayConfig, WorkflowsClient};
//! use gcphcp_types::WorkflowScope;
//!
//! async fn latest() -> Result<(), gcphcp_api::WorkflowError> {
//!     let config = GatewayConfig::from_env(WorkflowScope::new("my-project", "us-central1"));
//!     let client = WorkflowsClient::connect(&config).await?;
//!     for record in client.list_executions("get", 5).await? {
//!         println!("{} {}", record.handle.id(), record.state);
//!     }
//!     client.close();
//!     Ok(())
//! }
//! ```

mod callbacks;
pub mod classify;
pub mod config;
pub mod credentials;
mod error;
mod gateway;
mod wire;

pub use classify::{CauseKind, ClassifiedError, classify, classify_response};
pub use config::{ConfigError, GatewayConfig, validate_base_url};
pub use credentials::resolve_access_token;
pub use error::{CancelReason, ErrorKind, WorkflowError};
pub use gateway::{CallbackGateway, ExecutionGateway, WorkflowsClient};

use serde_json::Value;

/// Parse user-supplied JSON argument text. Empty text means "no arguments".
pub fn parse_argument(text: &str) -> Result<Value, WorkflowError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(text).map_err(|error| WorkflowError::encoding("workflow arguments", error))
}
