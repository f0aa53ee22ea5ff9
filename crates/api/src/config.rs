//! Explicit gateway configuration.
//!
//! A [`GatewayConfig`] is built once by the caller and passed by reference
//! into [`crate::WorkflowsClient::connect`]; nothing in this crate reads
//! project, region or endpoint settings from ambient process state.

use std::env;
use std::time::Duration;

use gcphcp_types::WorkflowScope;
use reqwest::Url;
use thiserror::Error;

/// Default base URL of the workflow execution management surface.
pub const DEFAULT_EXECUTIONS_API_BASE: &str = "https://workflowexecutions.googleapis.com/v1";
/// Default base URL of the workflow definition surface.
pub const DEFAULT_WORKFLOWS_API_BASE: &str = "https://workflows.googleapis.com/v1";
/// Environment variable overriding the executions base URL.
pub const EXECUTIONS_API_BASE_ENV: &str = "GCPHCP_EXECUTIONS_API_BASE";
/// Environment variable overriding the workflows base URL.
pub const WORKFLOWS_API_BASE_ENV: &str = "GCPHCP_WORKFLOWS_API_BASE";

/// Per-request timeout applied by both transport clients.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Allowed base domain for non-local endpoints. Subdomains are also allowed.
const ALLOWED_API_DOMAINS: &[&str] = &["googleapis.com"];
/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Configuration problems detected before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("'{url}' must use https for non-localhost hosts")]
    InsecureScheme { url: String },

    #[error("host '{host}' is not allowed; must be googleapis.com, a subdomain of it, or localhost")]
    HostNotAllowed { host: String },

    #[error("{0} must not be empty")]
    MissingValue(&'static str),
}

/// Everything the gateway needs to talk to the remote service.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub scope: WorkflowScope,
    pub executions_base_url: String,
    pub workflows_base_url: String,
    pub request_timeout: Duration,
    /// Pre-resolved OAuth2 access token. When `None`, the ambient credential
    /// chain is consulted at connect time.
    pub access_token: Option<String>,
}

impl GatewayConfig {
    /// Configuration for the public endpoints.
    pub fn new(scope: WorkflowScope) -> Self {
        Self {
            scope,
            executions_base_url: DEFAULT_EXECUTIONS_API_BASE.to_string(),
            workflows_base_url: DEFAULT_WORKFLOWS_API_BASE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            access_token: None,
        }
    }

    /// Configuration honouring the endpoint override environment variables.
    pub fn from_env(scope: WorkflowScope) -> Self {
        let mut config = Self::new(scope);
        if let Ok(base) = env::var(EXECUTIONS_API_BASE_ENV)
            && !base.trim().is_empty()
        {
            config.executions_base_url = base.trim().to_string();
        }
        if let Ok(base) = env::var(WORKFLOWS_API_BASE_ENV)
            && !base.trim().is_empty()
        {
            config.workflows_base_url = base.trim().to_string();
        }
        config
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Point both surfaces at the same base URL, as local emulators do.
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.executions_base_url = base.clone();
        self.workflows_base_url = base;
        self
    }

    /// Check scope values and both endpoint URLs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scope.project.trim().is_empty() {
            return Err(ConfigError::MissingValue("project"));
        }
        if self.scope.region.trim().is_empty() {
            return Err(ConfigError::MissingValue("region"));
        }
        validate_base_url(&self.executions_base_url)?;
        validate_base_url(&self.workflows_base_url)?;
        Ok(())
    }
}

/// Validate that a URL is acceptable to send credentials to.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS, and host must be `googleapis.com` or a
///   subdomain of it
pub fn validate_base_url(base: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(base).map_err(|error| ConfigError::InvalidUrl {
        url: base.to_string(),
        reason: error.to_string(),
    })?;

    let host_name = parsed.host_str().ok_or_else(|| ConfigError::InvalidUrl {
        url: base.to_string(),
        reason: "URL must include a host".to_string(),
    })?;

    if LOCALHOST_DOMAINS.iter().any(|&allowed| host_name.eq_ignore_ascii_case(allowed)) {
        return Ok(());
    }

    if parsed.scheme() != "https" {
        return Err(ConfigError::InsecureScheme { url: base.to_string() });
    }

    let is_allowed_domain = ALLOWED_API_DOMAINS.iter().any(|&allowed_domain| {
        host_name.eq_ignore_ascii_case(allowed_domain) || host_name.ends_with(&format!(".{}", allowed_domain))
    });
    if !is_allowed_domain {
        return Err(ConfigError::HostNotAllowed {
            host: host_name.to_string(),
        });
    }

    Ok(())
}
