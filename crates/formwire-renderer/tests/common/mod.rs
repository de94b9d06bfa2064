//! Host-side driver for exercising a renderer session end to end.
#![allow(dead_code)]

use formwire_contract::{gen_message_id, ApplicationIdentity, Envelope, RendererCapabilities};
use formwire_renderer::testing::{CollectingSink, RecordingSender};
use formwire_renderer::{ChannelBinding, RendererSession, SessionOptions};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const HANDLE: &str = "handle-1";
pub const ORIGIN: &str = "https://host.example.org";

/// A bound session plus recording ports, driven from the host's side.
pub struct Harness {
    pub session: RendererSession,
    pub sender: Arc<RecordingSender>,
    pub errors: Arc<CollectingSink>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(
            SessionOptions::new(
                ApplicationIdentity::new("Test Renderer").with_version("0.1.0"),
            )
            .with_capabilities(RendererCapabilities {
                extraction: Some(true),
                focus_change_notifications: Some(true),
            }),
        )
    }

    pub fn with_options(options: SessionOptions) -> Self {
        let sender = Arc::new(RecordingSender::new());
        let errors = Arc::new(CollectingSink::new());
        let session = RendererSession::new(
            options,
            Some(ChannelBinding::new(HANDLE, ORIGIN)),
            sender.clone(),
        )
        .with_error_sink(errors.clone());
        Self {
            session,
            sender,
            errors,
        }
    }

    /// Register an extract capability on the underlying session.
    #[must_use]
    pub fn with_extract(
        mut self,
        capability: Arc<dyn formwire_renderer::ExtractCapability>,
    ) -> Self {
        self.session = self.session.with_extract_capability(capability);
        self
    }

    /// Deliver a host request and return the renderer's synchronous
    /// response.
    pub async fn request(&mut self, message_type: &str, payload: Value) -> Envelope {
        let id = self.send(message_type, payload).await;
        self.sender
            .response_to(&id)
            .unwrap_or_else(|| panic!("no response to {message_type}"))
    }

    /// Deliver a host request without expecting a response. Returns the
    /// request's message id.
    pub async fn send(&mut self, message_type: &str, payload: Value) -> String {
        let envelope = host_request(message_type, payload);
        let id = envelope.message_id.clone();
        self.session.handle_message(envelope).await.unwrap();
        id
    }

    /// Run the lifecycle up to `Ready` with the given questionnaire.
    pub async fn ready_with(&mut self, questionnaire_payload: Value) {
        self.request("status.handshake", json!({"fhirVersion": "4.0.1"})).await;
        self.request("sdc.configure", json!({})).await;
        self.request(
            "sdc.configureContext",
            json!({"context": {"subject": {"reference": "Patient/1"}}}),
        )
        .await;
        self.request("sdc.displayQuestionnaire", questionnaire_payload).await;
    }

    /// Run the lifecycle up to `Ready` with a default questionnaire and no
    /// pre-loaded response.
    pub async fn ready(&mut self) {
        self.ready_with(json!({"questionnaire": questionnaire("q1")})).await;
    }

    /// Wait until a response correlated to `request_id` shows up (for the
    /// detached extract path).
    pub async fn response_eventually(&self, request_id: &str) -> Envelope {
        wait_for_response(&self.sender, request_id).await
    }
}

pub async fn wait_for_response(sender: &RecordingSender, request_id: &str) -> Envelope {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Some(envelope) = sender.response_to(request_id) {
                return envelope;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timed out waiting for response")
}

/// A request envelope as the host would send it.
pub fn host_request(message_type: &str, payload: Value) -> Envelope {
    Envelope {
        messaging_handle: Some(HANDLE.to_string()),
        message_id: gen_message_id(),
        message_type: message_type.to_string(),
        payload,
        response_to_message_id: None,
    }
}

pub fn questionnaire(id: &str) -> Value {
    json!({
        "resourceType": "Questionnaire",
        "id": id,
        "status": "active",
        "item": [{"linkId": "q1", "text": "Name", "type": "string"}]
    })
}

pub fn questionnaire_response(status: &str) -> Value {
    json!({
        "resourceType": "QuestionnaireResponse",
        "status": status,
        "questionnaire": "Questionnaire/q1",
        "item": [{"linkId": "q1", "answer": [{"valueString": "Jane"}]}]
    })
}
