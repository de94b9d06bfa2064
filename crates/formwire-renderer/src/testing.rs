//! In-memory ports for driving a session in tests.

use crate::ports::{ChannelError, ErrorSink, MessageSender, SessionError};
use async_trait::async_trait;
use formwire_contract::Envelope;
use std::sync::Mutex;

/// [`MessageSender`] that records every envelope it is given.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Envelope>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<Envelope> {
        self.sent.lock().expect("sender poisoned").clone()
    }

    /// The response correlated to `request_id`, if one was sent.
    pub fn response_to(&self, request_id: &str) -> Option<Envelope> {
        self.sent()
            .into_iter()
            .find(|envelope| envelope.response_to_message_id.as_deref() == Some(request_id))
    }

    /// Drain the recording.
    pub fn take(&self) -> Vec<Envelope> {
        std::mem::take(&mut *self.sent.lock().expect("sender poisoned"))
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, envelope: Envelope) -> Result<(), ChannelError> {
        self.sent.lock().expect("sender poisoned").push(envelope);
        Ok(())
    }
}

/// [`ErrorSink`] that collects every reported error.
#[derive(Default)]
pub struct CollectingSink {
    errors: Mutex<Vec<SessionError>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<SessionError> {
        self.errors.lock().expect("sink poisoned").clone()
    }
}

impl ErrorSink for CollectingSink {
    fn report(&self, error: SessionError) {
        self.errors.lock().expect("sink poisoned").push(error);
    }
}
