//! Failure classification for remote calls.
//!
//! Every remote failure is mapped onto a [`CauseKind`] with a remediation
//! hint before it reaches a caller. Classification is a pure function of the
//! failure text (and the HTTP status when the transport exposes one), so it
//! is tested without any network code.

use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Cause of a remote failure, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CauseKind {
    MissingCredentials,
    ExpiredCredentials,
    PermissionDenied,
    ResourceNotFound,
    Unauthenticated,
    Unclassified,
}

/// Substrings that identify each cause, checked in declaration order.
const CAUSE_PATTERNS: &[(CauseKind, &[&str])] = &[
    (CauseKind::MissingCredentials, &["could not find default credentials"]),
    (CauseKind::ExpiredCredentials, &["token expired", "oauth2: token expired"]),
    (
        CauseKind::PermissionDenied,
        &["PermissionDenied", "PERMISSION_DENIED", "permission denied", "403"],
    ),
    (CauseKind::ResourceNotFound, &["NotFound", "NOT_FOUND", "not found"]),
    (CauseKind::Unauthenticated, &["Unauthenticated", "UNAUTHENTICATED", "401"]),
];

impl CauseKind {
    /// Short description used in place of the raw message.
    pub fn summary(self) -> Option<&'static str> {
        match self {
            Self::MissingCredentials => Some("no GCP credentials found"),
            Self::ExpiredCredentials => Some("GCP credentials have expired"),
            Self::PermissionDenied => Some("permission denied"),
            Self::ResourceNotFound => Some("resource not found"),
            Self::Unauthenticated => Some("authentication failed"),
            Self::Unclassified => None,
        }
    }

    /// Operator guidance for resolving the failure.
    pub fn remediation(self) -> Option<&'static str> {
        match self {
            Self::MissingCredentials => Some(
                "  Run: gcloud auth application-default login\n  \
                 Or set GCPHCP_ACCESS_TOKEN to an OAuth2 access token",
            ),
            Self::ExpiredCredentials => Some("  Run: gcloud auth application-default login"),
            Self::PermissionDenied => Some(
                "  Ensure your account has the required roles:\n    \
                 - roles/workflows.invoker (to execute workflows)\n    \
                 - roles/workflows.viewer (to list workflows)\n\n  \
                 Check: gcloud projects get-iam-policy <project> --flatten='bindings[].members' \
                 --filter='bindings.members:<your-email>'",
            ),
            Self::ResourceNotFound => Some(
                "  Verify the workflow exists: gcphcp ops wf list --project <project> --region <region>\n  \
                 Check --project and --region flags are correct",
            ),
            Self::Unauthenticated => Some(
                "  Run: gcloud auth application-default login\n  \
                 Or: gcloud auth login",
            ),
            Self::Unclassified => None,
        }
    }
}

impl fmt::Display for CauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A remote failure with its cause, the action that failed and remediation guidance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ClassifiedError {
    kind: CauseKind,
    action: String,
    status: Option<u16>,
    message: String,
}

impl ClassifiedError {
    pub fn kind(&self) -> CauseKind {
        self.kind
    }

    /// The operation that failed, e.g. `getting execution status`.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// HTTP status of the failed response, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The underlying failure text, unchanged.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn remediation(&self) -> Option<&'static str> {
        self.kind.remediation()
    }
}

impl fmt::Display for ClassifiedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind.summary(), self.kind.remediation()) {
            (Some(summary), Some(remediation)) => match self.status {
                Some(status) => write!(
                    f,
                    "{}: {} (HTTP {}: {})\n\n{}",
                    self.action, summary, status, self.message, remediation
                ),
                None => write!(f, "{}: {}\n\n{}", self.action, summary, remediation),
            },
            _ => match self.status {
                Some(status) => write!(f, "{}: HTTP {}: {}", self.action, status, self.message),
                None => write!(f, "{}: {}", self.action, self.message),
            },
        }
    }
}

/// Classify raw failure text. The first matching cause wins; unmatched text
/// is wrapped unchanged as [`CauseKind::Unclassified`].
pub fn classify(action: &str, message: &str) -> ClassifiedError {
    ClassifiedError {
        kind: match_cause(message, CAUSE_PATTERNS),
        action: action.to_string(),
        status: None,
        message: message.to_string(),
    }
}

/// Classify a non-success HTTP response.
///
/// Credential causes are only visible in the body text, so they are matched
/// first. The status code then decides between the auth and lookup causes;
/// bodies of other statuses fall back to substring matching.
pub fn classify_response(action: &str, status: u16, body: &str) -> ClassifiedError {
    let credential_kind = match_cause(body, &CAUSE_PATTERNS[..2]);
    let kind = if credential_kind != CauseKind::Unclassified {
        credential_kind
    } else {
        match status {
            401 => CauseKind::Unauthenticated,
            403 => CauseKind::PermissionDenied,
            404 => CauseKind::ResourceNotFound,
            _ => match_cause(body, CAUSE_PATTERNS),
        }
    };
    ClassifiedError {
        kind,
        action: action.to_string(),
        status: Some(status),
        message: body.to_string(),
    }
}

/// Classify a transport-level error, including its full source chain.
pub fn classify_transport(action: &str, error: &(dyn StdError + 'static)) -> ClassifiedError {
    classify(action, &error_chain_text(error))
}

fn match_cause(message: &str, patterns: &[(CauseKind, &[&str])]) -> CauseKind {
    patterns
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| message.contains(needle)))
        .map(|(kind, _)| *kind)
        .unwrap_or(CauseKind::Unclassified)
}

fn error_chain_text(error: &(dyn StdError + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_points_at_login() {
        let error = classify("creating workflows client", "google: could not find default credentials. See ...");

        assert_eq!(error.kind(), CauseKind::MissingCredentials);
        let remediation = error.remediation().expect("remediation");
        assert!(remediation.contains("gcloud auth application-default login"));
        assert!(error.to_string().starts_with("creating workflows client: no GCP credentials found"));
    }

    #[test]
    fn unrecognised_text_is_preserved_verbatim() {
        let raw = "connection reset by peer (os error 104)";
        let error = classify("getting execution status", raw);

        assert_eq!(error.kind(), CauseKind::Unclassified);
        assert_eq!(error.message(), raw);
        assert_eq!(error.remediation(), None);
        assert_eq!(error.to_string(), format!("getting execution status: {raw}"));
    }

    #[test]
    fn first_match_wins_in_priority_order() {
        // Both "token expired" and "401" appear; expiry is checked first.
        let error = classify("listing workflows", "rpc error 401: oauth2: token expired");
        assert_eq!(error.kind(), CauseKind::ExpiredCredentials);

        let error = classify("listing workflows", "rpc error: code = PermissionDenied desc = 403 not found");
        assert_eq!(error.kind(), CauseKind::PermissionDenied);

        let error = classify("listing workflows", "workflow not found");
        assert_eq!(error.kind(), CauseKind::ResourceNotFound);

        let error = classify("listing workflows", "request had invalid authentication credentials: 401");
        assert_eq!(error.kind(), CauseKind::Unauthenticated);
    }

    #[test]
    fn status_codes_take_precedence_over_body_text() {
        let body = r#"{"error":{"code":403,"message":"Workflow not found or permission denied","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(classify_response("getting execution status", 403, body).kind(), CauseKind::PermissionDenied);

        let body = r#"{"error":{"code":404,"message":"Resource 'x' was not found","status":"NOT_FOUND"}}"#;
        assert_eq!(classify_response("getting execution status", 404, body).kind(), CauseKind::ResourceNotFound);

        assert_eq!(classify_response("listing callbacks", 401, "").kind(), CauseKind::Unauthenticated);
    }

    #[test]
    fn expired_token_body_beats_unauthenticated_status() {
        let error = classify_response("listing workflows", 401, "oauth2: token expired");
        assert_eq!(error.kind(), CauseKind::ExpiredCredentials);
        assert_eq!(error.status(), Some(401));
    }

    #[test]
    fn unclassified_response_keeps_the_body() {
        let error = classify_response("triggering callback", 500, "backend exploded");
        assert_eq!(error.kind(), CauseKind::Unclassified);
        assert_eq!(error.message(), "backend exploded");
        assert_eq!(error.to_string(), "triggering callback: HTTP 500: backend exploded");
    }

    #[test]
    fn classified_response_keeps_status_and_body_beside_the_hint() {
        let error = classify_response("triggering callback", 404, "callback cb1 was already received");
        assert_eq!(error.kind(), CauseKind::ResourceNotFound);

        let rendered = error.to_string();
        assert!(
            rendered.starts_with("triggering callback: resource not found (HTTP 404: callback cb1 was already received)\n\n"),
            "{rendered}"
        );
        assert!(rendered.contains("Verify the workflow exists"), "{rendered}");
    }

    #[test]
    fn transport_errors_include_their_sources() {
        #[derive(Debug, Error)]
        #[error("error sending request")]
        struct Outer(#[source] Inner);

        #[derive(Debug, Error)]
        #[error("could not find default credentials")]
        struct Inner;

        let error = classify_transport("creating execution", &Outer(Inner));
        assert_eq!(error.kind(), CauseKind::MissingCredentials);
        assert_eq!(error.message(), "error sending request: could not find default credentials");
    }
}
