//! `OperationOutcome`: the uniform error/result descriptor.
//!
//! Every rejection path in the protocol produces this single-issue shape so
//! hosts can pattern-match on `issue[0].code` and `severity` regardless of
//! which message type failed.

use serde::{Deserialize, Serialize};

/// Issue severity, per the FHIR value set subset this protocol uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

/// Issue code taxonomy surfaced to hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCode {
    /// Structural payload check failed, a required resource is missing, or
    /// the message arrived before its minimum phase.
    Invalid,
    /// A query-style request has no data to return.
    NotFound,
    /// The requested capability is not registered.
    NotSupported,
    /// An external collaborator failed while fulfilling the request.
    Exception,
}

/// One issue inside an [`OperationOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeIssue {
    pub severity: IssueSeverity,
    pub code: IssueCode,
    pub diagnostics: String,
}

/// Structured error/result descriptor sent back to the host.
///
/// Constructed fresh by [`build_outcome`]; never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationOutcome {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    pub issue: Vec<OutcomeIssue>,
}

/// Build a single-issue outcome.
pub fn build_outcome(
    severity: IssueSeverity,
    code: IssueCode,
    diagnostics: impl Into<String>,
) -> OperationOutcome {
    OperationOutcome {
        resource_type: "OperationOutcome".to_string(),
        issue: vec![OutcomeIssue {
            severity,
            code,
            diagnostics: diagnostics.into(),
        }],
    }
}
