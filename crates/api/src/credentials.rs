//! Ambient credential discovery.
//!
//! Resolution order for the bearer token:
//! - an explicit token on the [`crate::GatewayConfig`]
//! - `GCPHCP_ACCESS_TOKEN`
//! - `GOOGLE_OAUTH_ACCESS_TOKEN`
//! - `gcloud auth application-default print-access-token`
//!
//! Failures are reported with text the classifier recognises, so a machine
//! without any credentials surfaces as `MissingCredentials`.

use std::env;

use tokio::process::Command;
use tracing::debug;

use crate::classify::{CauseKind, ClassifiedError, classify};

/// Environment variable holding an OAuth2 access token for this tool.
pub const ACCESS_TOKEN_ENV: &str = "GCPHCP_ACCESS_TOKEN";
/// Environment variable honoured by the Google tooling for access tokens.
pub const GOOGLE_ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

const RESOLVE_ACTION: &str = "creating workflows client";

/// Resolve the bearer token used by both transport clients.
pub async fn resolve_access_token(explicit: Option<&str>) -> Result<String, ClassifiedError> {
    if let Some(token) = explicit.map(str::trim).filter(|token| !token.is_empty()) {
        debug!("using explicitly configured access token");
        return Ok(token.to_string());
    }
    if let Some(token) = token_from_env() {
        return Ok(token);
    }
    token_from_gcloud().await
}

/// Read a token from the environment, preferring the tool-specific variable.
pub fn token_from_env() -> Option<String> {
    [ACCESS_TOKEN_ENV, GOOGLE_ACCESS_TOKEN_ENV].iter().find_map(|name| {
        let value = env::var(name).ok()?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        debug!(source = %name, "using access token from environment");
        Some(trimmed.to_string())
    })
}

async fn token_from_gcloud() -> Result<String, ClassifiedError> {
    let output = Command::new("gcloud")
        .args(["auth", "application-default", "print-access-token"])
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|error| {
            classify(
                RESOLVE_ACTION,
                &format!("could not find default credentials: gcloud is not available ({error})"),
            )
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(gcloud_failure(&stderr));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(classify(
            RESOLVE_ACTION,
            "could not find default credentials: gcloud returned an empty token",
        ));
    }
    debug!("using access token from gcloud application-default credentials");
    Ok(token)
}

/// gcloud's own wording varies; anything other than an expiry report is
/// treated as missing credentials.
fn gcloud_failure(stderr: &str) -> ClassifiedError {
    let classified = classify(RESOLVE_ACTION, stderr);
    if matches!(classified.kind(), CauseKind::MissingCredentials | CauseKind::ExpiredCredentials) {
        return classified;
    }
    classify(RESOLVE_ACTION, &format!("could not find default credentials: {stderr}"))
}
