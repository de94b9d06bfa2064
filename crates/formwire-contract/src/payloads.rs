//! Typed payloads for the messages this protocol produces.
//!
//! Inbound request payloads stay `serde_json::Value` and are shape-checked
//! by [`crate::guards`]; everything the renderer sends back is typed here.

use crate::outcome::OperationOutcome;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Renderer identity echoed back in the handshake reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationIdentity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ApplicationIdentity {
    /// Create an identity with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            publisher: None,
            version: None,
        }
    }

    /// Set the publisher.
    #[must_use]
    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    /// Set the version string.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Optional renderer capabilities advertised to the host.
///
/// Advertisement only: the dispatcher never gates behavior on these flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_change_notifications: Option<bool>,
}

/// Payload of the handshake request the renderer sends at bootstrap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeRequestPayload {
    pub protocol_version: String,
    pub fhir_version: String,
}

impl Default for HandshakeRequestPayload {
    fn default() -> Self {
        Self {
            protocol_version: "1.0".to_string(),
            fhir_version: "R4".to_string(),
        }
    }
}

/// Payload of the renderer's reply to a host handshake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakeReplyPayload {
    pub application: ApplicationIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capabilities: Option<RendererCapabilities>,
}

/// Success/error discriminator for status-style replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Success,
    Error,
}

/// Reply payload for configure/display requests: `{status}` on success,
/// `{status, outcome}` on error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReplyPayload {
    pub status: ReplyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OperationOutcome>,
}

impl StatusReplyPayload {
    /// Successful reply.
    pub fn success() -> Self {
        Self {
            status: ReplyStatus::Success,
            outcome: None,
        }
    }

    /// Failed reply carrying the given outcome.
    pub fn error(outcome: OperationOutcome) -> Self {
        Self {
            status: ReplyStatus::Error,
            outcome: Some(outcome),
        }
    }
}

/// Failure reply for query-style requests: bare `{outcome}`, no status
/// field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeReplyPayload {
    pub outcome: OperationOutcome,
}

/// Successful reply to `sdc.requestCurrentQuestionnaireResponse`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentResponseReplyPayload {
    pub questionnaire_response: Value,
}

/// Payload of the `sdc.ui.changedQuestionnaireResponse` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedQuestionnaireResponsePayload {
    pub questionnaire_response: Value,
}
