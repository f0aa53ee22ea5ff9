use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ExecutionHandle;

/// Lifecycle state of an execution.
///
/// `Queued -> Active -> {Succeeded, Failed, Cancelled}`. The last three are
/// terminal: an execution never leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    Queued,
    Active,
    Succeeded,
    Failed,
    Cancelled,
}

impl ExecutionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Position in the lifecycle; terminal states share the highest rank.
    pub fn rank(self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Active => 1,
            Self::Succeeded | Self::Failed | Self::Cancelled => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Active => "ACTIVE",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for a state string outside the known lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown execution state '{0}'")]
pub struct UnknownStateError(pub String);

impl FromStr for ExecutionState {
    type Err = UnknownStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "QUEUED" => Ok(Self::Queued),
            "ACTIVE" => Ok(Self::Active),
            "SUCCEEDED" => Ok(Self::Succeeded),
            "FAILED" => Ok(Self::Failed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(UnknownStateError(other.to_string())),
        }
    }
}

/// Point-in-time read of one execution.
///
/// `result` is only populated for [`ExecutionState::Succeeded`] and
/// `failure_context` only for [`ExecutionState::Failed`]. `end_time` is absent
/// while the execution is non-terminal, and [`ExecutionRecord::duration`] is
/// defined exactly when `end_time` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub handle: ExecutionHandle,
    pub state: ExecutionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_context: Option<String>,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl ExecutionRecord {
    /// Record for an execution that has not finished yet.
    pub fn pending(handle: ExecutionHandle, state: ExecutionState, start_time: DateTime<Utc>) -> Self {
        Self {
            handle,
            state,
            argument: None,
            result: None,
            failure_context: None,
            start_time,
            end_time: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Elapsed time between start and end; `None` until the end time is known.
    pub fn duration(&self) -> Option<TimeDelta> {
        self.end_time.map(|end_time| end_time - self.start_time)
    }
}
