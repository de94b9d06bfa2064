//! Shared wire-level contracts for the SDC SMART Web Messaging protocol.
//!
//! This crate defines what travels over the channel between a host
//! application and an embedded questionnaire renderer: the message envelope,
//! the closed set of message types, structural payload guards, the
//! `OperationOutcome` error descriptor, and the questionnaire launch context.
//! It carries no runtime state; the renderer-side session lives in
//! `formwire-renderer`.

pub mod context;
pub mod envelope;
pub mod guards;
pub mod message_type;
pub mod outcome;
pub mod payloads;

pub use context::{merge_context, LaunchContextEntry, QuestionnaireContext};
pub use envelope::{gen_message_id, Envelope};
pub use guards::{
    context_from_payload, is_configure_context_payload, is_configure_payload,
    is_display_questionnaire_payload, is_display_questionnaire_response_payload, is_questionnaire,
    is_questionnaire_context, is_questionnaire_response, is_record, resolve_questionnaire,
    resolve_questionnaire_response,
};
pub use message_type::SwmMessageType;
pub use outcome::{build_outcome, IssueCode, IssueSeverity, OperationOutcome, OutcomeIssue};
pub use payloads::{
    ApplicationIdentity, ChangedQuestionnaireResponsePayload, CurrentResponseReplyPayload,
    HandshakeReplyPayload, HandshakeRequestPayload, OutcomeReplyPayload, RendererCapabilities,
    ReplyStatus, StatusReplyPayload,
};
