//! Ports the embedding application plugs into the session.
//!
//! The session has no direct dependency on a transport or UI layer: outbound
//! traffic goes through [`MessageSender`], local failures through
//! [`ErrorSink`], and structured data extraction through an optional
//! [`ExtractCapability`].

use crate::phase::Phase;
use async_trait::async_trait;
use formwire_contract::{Envelope, SwmMessageType};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Outbound channel failure.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// The underlying channel is gone; no further traffic is possible.
    #[error("message channel closed")]
    Closed,
    /// An outbound payload could not be encoded.
    #[error("failed to encode outbound payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Outbound half of the message channel.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver one envelope to the host.
    async fn send(&self, envelope: Envelope) -> Result<(), ChannelError>;
}

/// A protocol-level failure reported to the embedding application.
///
/// Carries the phase at the time of failure and the offending message type
/// when one is known. These are never fatal; the session stays usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub phase: Phase,
    pub message_type: Option<SwmMessageType>,
    pub message: String,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Local error reporting port.
pub trait ErrorSink: Send + Sync {
    /// Called once per protocol failure.
    fn report(&self, error: SessionError);
}

impl<F> ErrorSink for F
where
    F: Fn(SessionError) + Send + Sync,
{
    fn report(&self, error: SessionError) {
        self(error)
    }
}

/// Failure produced by an [`ExtractCapability`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ExtractError {
    pub message: String,
}

impl ExtractError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Optional capability fulfilling `sdc.requestExtract`.
///
/// The returned value is forwarded to the host as the response payload
/// unchanged; a failure is converted into an `exception` outcome by the
/// session. Extraction may suspend for as long as it needs — the session
/// keeps dispatching other messages while it runs.
#[async_trait]
pub trait ExtractCapability: Send + Sync {
    async fn extract(&self, payload: Value) -> Result<Value, ExtractError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_error_sinks() {
        let sink = |error: SessionError| {
            assert_eq!(error.message, "boom");
        };
        sink.report(SessionError {
            phase: Phase::Ready,
            message_type: None,
            message: "boom".to_string(),
        });
    }

    #[test]
    fn extract_error_displays_its_message() {
        let error = ExtractError::new("no mapping defined");
        assert_eq!(error.to_string(), "no mapping defined");
    }
}
