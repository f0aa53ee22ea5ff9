use std::fmt;
use std::time::Duration;

use gcphcp_types::{ExecutionHandle, ExecutionState};
use serde::Serialize;
use thiserror::Error;

use crate::classify::{CauseKind, ClassifiedError};
use crate::config::ConfigError;

/// Flat view of every failure the workflow core can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    MissingCredentials,
    ExpiredCredentials,
    PermissionDenied,
    ResourceNotFound,
    Unauthenticated,
    RemoteCallFailed,
    CancelledOrTimedOut,
    ArgumentEncodingFailed,
    NoCompatibleCallback,
    UnexpectedCallbackState,
    InvalidConfiguration,
}

impl From<CauseKind> for ErrorKind {
    fn from(kind: CauseKind) -> Self {
        match kind {
            CauseKind::MissingCredentials => Self::MissingCredentials,
            CauseKind::ExpiredCredentials => Self::ExpiredCredentials,
            CauseKind::PermissionDenied => Self::PermissionDenied,
            CauseKind::ResourceNotFound => Self::ResourceNotFound,
            CauseKind::Unauthenticated => Self::Unauthenticated,
            CauseKind::Unclassified => Self::RemoteCallFailed,
        }
    }
}

/// Why a blocking operation stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller-supplied deadline elapsed.
    DeadlineElapsed(Duration),
    /// The caller cancelled (for example on Ctrl+C).
    Cancelled,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineElapsed(timeout) => write!(f, "deadline of {:?} elapsed", timeout),
            Self::Cancelled => f.write_str("cancelled by caller"),
        }
    }
}

/// Errors surfaced by the gateway, callback subsystem and execution tracker.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A classified remote failure.
    #[error(transparent)]
    Remote(#[from] ClassifiedError),

    /// The wait was abandoned; the remote execution keeps running.
    #[error("{action}: {reason}")]
    Cancelled { action: String, reason: CancelReason },

    #[error("encoding {what}: {source}")]
    ArgumentEncoding {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("execution {execution} is ACTIVE but has no pending callbacks")]
    NoCompatibleCallback { execution: ExecutionHandle },

    #[error("execution {execution} is {state}, not waiting on a callback")]
    UnexpectedCallbackState { execution: ExecutionHandle, state: ExecutionState },

    #[error("invalid gateway configuration: {0}")]
    Config(#[from] ConfigError),
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Remote(error) => error.kind().into(),
            Self::Cancelled { .. } => ErrorKind::CancelledOrTimedOut,
            Self::ArgumentEncoding { .. } => ErrorKind::ArgumentEncodingFailed,
            Self::NoCompatibleCallback { .. } => ErrorKind::NoCompatibleCallback,
            Self::UnexpectedCallbackState { .. } => ErrorKind::UnexpectedCallbackState,
            Self::Config(_) => ErrorKind::InvalidConfiguration,
        }
    }

    /// Remediation guidance attached to classified failures.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::Remote(error) => error.remediation(),
            _ => None,
        }
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub(crate) fn encoding(what: &'static str, source: serde_json::Error) -> Self {
        Self::ArgumentEncoding { what, source }
    }
}
