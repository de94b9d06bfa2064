//! Session-owned data and its read-only snapshot.

use crate::phase::Phase;
use formwire_contract::QuestionnaireContext;
use serde_json::Value;

/// Mutable session data, owned exclusively by the dispatcher.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub questionnaire: Option<Value>,
    pub questionnaire_response: Option<Value>,
    pub context: Option<QuestionnaireContext>,
    pub config: Option<Value>,
    pub fhir_version: Option<String>,
}

/// Point-in-time view of a session for the embedding UI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub questionnaire: Option<Value>,
    pub questionnaire_response: Option<Value>,
    pub context: Option<QuestionnaireContext>,
    pub config: Option<Value>,
    pub fhir_version: Option<String>,
}
