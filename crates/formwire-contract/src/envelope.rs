//! SMART Web Messaging envelope.
//!
//! Every message on the channel, in either direction, is one [`Envelope`].
//! Responses are correlated to the request they answer via
//! `responseToMessageId`; requests and events carry none.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Generate a fresh message id for an outgoing envelope.
///
/// Unique within a session; not a cryptographic guarantee.
pub fn gen_message_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// One SMART Web Messaging message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Messaging handle negotiated at launch. Inbound messages carrying a
    /// different handle are not for this session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_handle: Option<String>,
    /// Sender-unique message id.
    pub message_id: String,
    /// Wire message type, e.g. `"sdc.configure"`.
    pub message_type: String,
    /// Opaque payload; shape is validated per message type by the receiver.
    #[serde(default)]
    pub payload: Value,
    /// Id of the request this message responds to, for responses only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_to_message_id: Option<String>,
}

impl Envelope {
    /// Build a request (or fire-and-forget event) envelope with a fresh id.
    pub fn request(
        messaging_handle: Option<String>,
        message_type: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            messaging_handle,
            message_id: gen_message_id(),
            message_type: message_type.into(),
            payload,
            response_to_message_id: None,
        }
    }

    /// Build a response envelope correlated to `response_to`.
    pub fn response(
        messaging_handle: Option<String>,
        message_type: impl Into<String>,
        response_to: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            messaging_handle,
            message_id: gen_message_id(),
            message_type: message_type.into(),
            payload,
            response_to_message_id: Some(response_to.into()),
        }
    }

    /// Whether this envelope answers an earlier request.
    pub fn is_response(&self) -> bool {
        self.response_to_message_id.is_some()
    }
}
