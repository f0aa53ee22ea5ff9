use serde::{Deserialize, Serialize};

/// A pending callback on an active execution.
///
/// Triggering `url` with `method` supplies data to the paused step and resumes
/// the execution. The descriptor is only meaningful while the owning
/// execution is `ACTIVE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackDescriptor {
    /// Full callback resource name as reported by the service.
    pub name: String,
    pub method: String,
    pub url: String,
}
