//! Renderer-side session runtime for the SDC SMART Web Messaging protocol.
//!
//! A [`RendererSession`] enforces the handshake → configure → context →
//! questionnaire → ready lifecycle over an already-established message
//! channel: every inbound message is phase-gated, shape-checked, and either
//! dispatched (mutating session state and replying) or rejected with a
//! structured `OperationOutcome` while the session stays usable.
//!
//! The runtime owns no transport. The embedding application supplies a
//! [`MessageSender`] for outbound traffic, an optional [`ErrorSink`] for
//! local error reporting, and an optional [`ExtractCapability`] that fulfils
//! `sdc.requestExtract` asynchronously.

pub mod channel;
pub mod messenger;
pub mod phase;
pub mod ports;
pub mod session;
pub mod state;
pub mod testing;

pub use channel::{serve, ChannelBinding, MpscSender};
pub use messenger::Messenger;
pub use phase::{required_phase, Phase, PhaseTracker};
pub use ports::{
    ChannelError, ErrorSink, ExtractCapability, ExtractError, MessageSender, SessionError,
};
pub use session::{RendererSession, SessionOptions};
pub use state::SessionSnapshot;
