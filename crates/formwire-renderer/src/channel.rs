//! Channel binding and the inbound message pump.
//!
//! The point-to-point delivery mechanism (postMessage, WebSocket, whatever)
//! is the embedding application's concern. This module covers the two
//! pieces the session needs from it: the launch-time binding parameters and
//! a pump that feeds raw inbound values into the dispatcher.

use crate::ports::{ChannelError, MessageSender};
use crate::session::RendererSession;
use async_trait::async_trait;
use formwire_contract::Envelope;
use serde_json::Value;
use tokio::sync::mpsc;

/// Channel parameters handed to the renderer at launch.
///
/// `origin` is consumed by the transport layer when it enforces the origin
/// restriction; the session itself only uses `handle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBinding {
    pub handle: String,
    pub origin: String,
}

impl ChannelBinding {
    pub fn new(handle: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            origin: origin.into(),
        }
    }

    /// Read the binding from launch query parameters
    /// (`messaging_handle` / `messaging_origin`). `None` unless both are
    /// present and non-empty.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut handle = None;
        let mut origin = None;
        for (key, value) in pairs {
            match key.as_ref() {
                "messaging_handle" => handle = Some(value.into()),
                "messaging_origin" => origin = Some(value.into()),
                _ => {}
            }
        }
        match (handle, origin) {
            (Some(handle), Some(origin)) if !handle.is_empty() && !origin.is_empty() => {
                Some(Self { handle, origin })
            }
            _ => None,
        }
    }
}

/// [`MessageSender`] backed by a tokio mpsc channel.
pub struct MpscSender {
    tx: mpsc::Sender<Envelope>,
}

impl MpscSender {
    pub fn new(tx: mpsc::Sender<Envelope>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl MessageSender for MpscSender {
    async fn send(&self, envelope: Envelope) -> Result<(), ChannelError> {
        self.tx.send(envelope).await.map_err(|_| ChannelError::Closed)
    }
}

/// Drive a session from raw inbound channel data until the channel closes.
///
/// Values that do not decode as an [`Envelope`] are dropped with a warning;
/// everything else goes through [`RendererSession::handle_message`], which
/// does its own classification and filtering.
pub async fn serve(
    session: &mut RendererSession,
    inbound: &mut mpsc::Receiver<Value>,
) -> Result<(), ChannelError> {
    while let Some(raw) = inbound.recv().await {
        let envelope: Envelope = match serde_json::from_value(raw) {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::warn!(error = %error, "dropping undecodable inbound message");
                continue;
            }
        };
        session.handle_message(envelope).await?;
    }
    Ok(())
}
