//! Shared data model for the GCP HCP workflow tooling.
//!
//! These types describe what the remote workflow service reports about
//! deployed workflows and their executions. They carry no transport logic;
//! the API crate decodes wire payloads into them and the engine and CLI
//! consume them.
//!
//! - [`WorkflowScope`]: the project/region pair every call is made against
//! - [`ExecutionHandle`]: the fully-qualified name of one execution
//! - [`ExecutionRecord`]: a point-in-time read of an execution
//! - [`WorkflowDescriptor`]: a deployed workflow definition
//! - [`CallbackDescriptor`]: a pending human-in-the-loop callback

mod callback;
mod execution;
mod handle;
mod workflow;

pub use callback::CallbackDescriptor;
pub use execution::{ExecutionRecord, ExecutionState, UnknownStateError};
pub use handle::{ExecutionHandle, HandleParseError, WorkflowScope};
pub use workflow::{WorkflowDescriptor, WorkflowLifecycle};
