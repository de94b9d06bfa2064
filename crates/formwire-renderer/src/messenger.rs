//! Outbound messenger: stamps the session handle and a fresh id on every
//! envelope it sends.

use crate::ports::{ChannelError, MessageSender};
use formwire_contract::{Envelope, SwmMessageType};
use serde::Serialize;
use std::sync::Arc;

/// Sends requests, responses, and events on behalf of one session.
#[derive(Clone)]
pub struct Messenger {
    handle: String,
    sender: Arc<dyn MessageSender>,
}

impl Messenger {
    pub fn new(handle: impl Into<String>, sender: Arc<dyn MessageSender>) -> Self {
        Self {
            handle: handle.into(),
            sender,
        }
    }

    /// Messaging handle stamped on outbound traffic; inbound traffic
    /// carrying a different handle is not for this session.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Send a request. Returns the generated message id so the caller can
    /// correlate the host's response.
    pub async fn send_request<P: Serialize>(
        &self,
        message_type: SwmMessageType,
        payload: &P,
    ) -> Result<String, ChannelError> {
        let envelope = Envelope::request(
            Some(self.handle.clone()),
            message_type.as_str(),
            serde_json::to_value(payload)?,
        );
        let message_id = envelope.message_id.clone();
        self.sender.send(envelope).await?;
        Ok(message_id)
    }

    /// Send a fire-and-forget event.
    pub async fn send_event<P: Serialize>(
        &self,
        message_type: SwmMessageType,
        payload: &P,
    ) -> Result<String, ChannelError> {
        self.send_request(message_type, payload).await
    }

    /// Send a response correlated to `response_to`.
    pub async fn send_response<P: Serialize>(
        &self,
        message_type: SwmMessageType,
        response_to: &str,
        payload: &P,
    ) -> Result<String, ChannelError> {
        let envelope = Envelope::response(
            Some(self.handle.clone()),
            message_type.as_str(),
            response_to,
            serde_json::to_value(payload)?,
        );
        let message_id = envelope.message_id.clone();
        self.sender.send(envelope).await?;
        Ok(message_id)
    }
}
