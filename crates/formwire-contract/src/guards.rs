//! Structural payload guards.
//!
//! One predicate per message type, each a total function over
//! `serde_json::Value`: pass/fail on shape, nothing semantic. Guards never
//! panic and never allocate. Fields that are present but `null` count as
//! absent, matching how hosts serialize optional fields.

use crate::context::QuestionnaireContext;
use serde_json::Value;

/// Present-and-non-null field accessor.
fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).filter(|candidate| !candidate.is_null())
}

/// Whether `value` is a JSON object.
pub fn is_record(value: &Value) -> bool {
    value.is_object()
}

/// Whether `value` is shaped like a FHIR Questionnaire.
pub fn is_questionnaire(value: &Value) -> bool {
    is_record(value) && value.get("resourceType").and_then(Value::as_str) == Some("Questionnaire")
}

/// Whether `value` is shaped like a FHIR QuestionnaireResponse.
pub fn is_questionnaire_response(value: &Value) -> bool {
    is_record(value)
        && value.get("resourceType").and_then(Value::as_str) == Some("QuestionnaireResponse")
}

/// Extract the questionnaire from a bare-resource payload or its wrapper
/// form. `None` means the payload carries no questionnaire at all, which is
/// a distinct failure from a malformed payload.
pub fn resolve_questionnaire(payload: &Value) -> Option<&Value> {
    if is_questionnaire(payload) {
        return Some(payload);
    }
    let candidate = payload.get("questionnaire")?;
    is_questionnaire(candidate).then_some(candidate)
}

/// Extract the questionnaire response from a bare-resource payload or its
/// wrapper form.
pub fn resolve_questionnaire_response(payload: &Value) -> Option<&Value> {
    if is_questionnaire_response(payload) {
        return Some(payload);
    }
    let candidate = payload.get("questionnaireResponse")?;
    is_questionnaire_response(candidate).then_some(candidate)
}

fn is_launch_context_entry(value: &Value) -> bool {
    if !is_record(value) {
        return false;
    }
    if value.get("name").and_then(Value::as_str).is_none() {
        return false;
    }
    if field(value, "contentReference").is_some_and(|inner| !is_record(inner)) {
        return false;
    }
    if field(value, "contentResource").is_some_and(|inner| !is_record(inner)) {
        return false;
    }
    true
}

/// Whether `value` satisfies the questionnaire-context shape.
pub fn is_questionnaire_context(value: &Value) -> bool {
    if !is_record(value) {
        return false;
    }
    for key in ["subject", "author", "encounter"] {
        if field(value, key).is_some_and(|inner| !is_record(inner)) {
            return false;
        }
    }
    match field(value, "launchContext") {
        None => true,
        Some(Value::Array(entries)) => entries.iter().all(is_launch_context_entry),
        Some(_) => false,
    }
}

/// Guard for `sdc.configure` payloads.
pub fn is_configure_payload(value: &Value) -> bool {
    if !is_record(value) {
        return false;
    }
    for key in ["terminologyServer", "dataServer"] {
        if field(value, key).is_some_and(|inner| !inner.is_string()) {
            return false;
        }
    }
    !field(value, "configuration").is_some_and(|inner| !is_record(inner))
}

/// Guard for `sdc.configureContext` payloads.
pub fn is_configure_context_payload(value: &Value) -> bool {
    if !is_record(value) {
        return false;
    }
    !field(value, "context").is_some_and(|inner| !is_questionnaire_context(inner))
}

/// Guard for `sdc.displayQuestionnaire` payloads: either a bare
/// questionnaire or a wrapper with independently checked optional fields.
pub fn is_display_questionnaire_payload(value: &Value) -> bool {
    if is_questionnaire(value) {
        return true;
    }
    if !is_record(value) {
        return false;
    }
    if field(value, "questionnaire").is_some_and(|inner| !is_questionnaire(inner)) {
        return false;
    }
    if field(value, "questionnaireResponse").is_some_and(|inner| !is_questionnaire_response(inner))
    {
        return false;
    }
    !field(value, "context").is_some_and(|inner| !is_questionnaire_context(inner))
}

/// Guard for `sdc.displayQuestionnaireResponse` payloads, symmetric to
/// [`is_display_questionnaire_payload`] and keyed on the response shape.
pub fn is_display_questionnaire_response_payload(value: &Value) -> bool {
    if is_questionnaire_response(value) {
        return true;
    }
    if !is_record(value) {
        return false;
    }
    if field(value, "questionnaireResponse").is_some_and(|inner| !is_questionnaire_response(inner))
    {
        return false;
    }
    !field(value, "questionnaire").is_some_and(|inner| !is_questionnaire(inner))
}

/// Pull a typed context out of a wrapper payload, if one is present and
/// well-shaped.
pub fn context_from_payload(payload: &Value) -> Option<QuestionnaireContext> {
    let context = field(payload, "context")?;
    if !is_questionnaire_context(context) {
        return None;
    }
    serde_json::from_value(context.clone()).ok()
}
