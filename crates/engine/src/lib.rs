//! # gcphcp engine
//!
//! Execution lifecycle on top of the gateway traits from `gcphcp-api`:
//!
//! - **`tracker`**: polls an execution to a terminal state with bounded
//!   exponential backoff, honouring a deadline and a cancellation token
//! - **`backoff`**: the poll interval policy (500 ms doubling to a 2 s cap)
//! - **`lifecycle`**: run (create + wait), status with pending callbacks, and
//!   resume through the first pending callback
//!
//! ## Usage
//!
//! ```ignore
//! use gcphcp_engine::{WaitControl, run_workflow};
//! use serde_json::json;
//!
//! let outcome = run_workflow(&client, "get", &json!({ "resource_type": "pods" }), &WaitControl::default()).await?;
//! println!("{} finished as {}", outcome.handle, outcome.wait?.state);
//! ```

pub mod backoff;
pub mod lifecycle;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use backoff::{Backoff, PollPolicy};
pub use lifecycle::{ExecutionStatus, ResumeOutcome, RunOutcome, execution_status, resume_execution, run_workflow};
pub use tracker::{ExecutionTracker, PollObservation, WaitControl};
