use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a deployed workflow definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowLifecycle {
    Active,
    Deprecated,
    Unknown,
}

impl WorkflowLifecycle {
    /// Map the service's state string; anything unrecognised is `Unknown`.
    pub fn from_api_str(state: &str) -> Self {
        match state.trim() {
            "ACTIVE" => Self::Active,
            "DEPRECATED" => Self::Deprecated,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Deprecated => "DEPRECATED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for WorkflowLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable snapshot of a deployed workflow definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDescriptor {
    /// Short name, without the `projects/.../workflows/` prefix.
    pub name: String,
    pub state: WorkflowLifecycle,
    pub revision_id: String,
    pub update_time: Option<DateTime<Utc>>,
}
