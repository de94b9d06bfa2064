//! Questionnaire launch context and its merge rule.
//!
//! Context arrives incrementally across messages (`sdc.configureContext`,
//! then optionally alongside `sdc.displayQuestionnaire`) and is overlaid,
//! not replaced wholesale.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One named launch-context item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchContextEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_resource: Option<Value>,
}

/// Partial questionnaire context supplied by the host.
///
/// `subject`/`author`/`encounter` are carried as opaque FHIR references or
/// resources; this crate checks their shape, not their clinical validity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_context: Option<Vec<LaunchContextEntry>>,
}

/// Overlay `incoming` onto `existing`.
///
/// Fields present in `incoming` win; fields it omits are preserved from
/// `existing`. An absent `incoming` returns `existing` unchanged. Neither
/// input is mutated.
///
/// `launchContext` merges by entry `name`: incoming entries replace
/// same-named existing entries, other existing entries are preserved, and
/// new names append in incoming order.
pub fn merge_context(
    existing: Option<&QuestionnaireContext>,
    incoming: Option<QuestionnaireContext>,
) -> Option<QuestionnaireContext> {
    let Some(incoming) = incoming else {
        return existing.cloned();
    };
    let Some(existing) = existing else {
        return Some(incoming);
    };
    Some(QuestionnaireContext {
        subject: incoming.subject.or_else(|| existing.subject.clone()),
        author: incoming.author.or_else(|| existing.author.clone()),
        encounter: incoming.encounter.or_else(|| existing.encounter.clone()),
        launch_context: match incoming.launch_context {
            Some(entries) => Some(merge_launch_context(
                existing.launch_context.as_deref().unwrap_or(&[]),
                entries,
            )),
            None => existing.launch_context.clone(),
        },
    })
}

fn merge_launch_context(
    existing: &[LaunchContextEntry],
    incoming: Vec<LaunchContextEntry>,
) -> Vec<LaunchContextEntry> {
    let mut merged = existing.to_vec();
    for entry in incoming {
        match merged.iter_mut().find(|known| known.name == entry.name) {
            Some(known) => *known = entry,
            None => merged.push(entry),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str, reference: &str) -> LaunchContextEntry {
        LaunchContextEntry {
            name: name.to_string(),
            content_reference: Some(json!({"reference": reference})),
            content_resource: None,
        }
    }

    #[test]
    fn absent_incoming_returns_existing() {
        let existing = QuestionnaireContext {
            subject: Some(json!({"reference": "Patient/1"})),
            ..Default::default()
        };
        assert_eq!(merge_context(Some(&existing), None).as_ref(), Some(&existing));
        assert_eq!(merge_context(None, None), None);
    }

    #[test]
    fn incoming_fields_overlay_existing_fields() {
        let existing = QuestionnaireContext {
            subject: Some(json!({"reference": "Patient/1"})),
            author: Some(json!({"reference": "Practitioner/9"})),
            ..Default::default()
        };
        let incoming = QuestionnaireContext {
            subject: Some(json!({"reference": "Patient/2"})),
            encounter: Some(json!({"reference": "Encounter/5"})),
            ..Default::default()
        };
        let merged = merge_context(Some(&existing), Some(incoming)).unwrap();
        assert_eq!(merged.subject, Some(json!({"reference": "Patient/2"})));
        assert_eq!(merged.author, Some(json!({"reference": "Practitioner/9"})));
        assert_eq!(merged.encounter, Some(json!({"reference": "Encounter/5"})));
    }

    #[test]
    fn launch_context_merges_by_name() {
        let existing = QuestionnaireContext {
            launch_context: Some(vec![entry("patient", "Patient/1"), entry("user", "Practitioner/9")]),
            ..Default::default()
        };
        let incoming = QuestionnaireContext {
            launch_context: Some(vec![entry("patient", "Patient/2"), entry("encounter", "Encounter/5")]),
            ..Default::default()
        };
        let merged = merge_context(Some(&existing), Some(incoming)).unwrap();
        let names: Vec<&str> = merged
            .launch_context
            .as_deref()
            .unwrap()
            .iter()
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(names, vec!["patient", "user", "encounter"]);
        assert_eq!(
            merged.launch_context.as_deref().unwrap()[0].content_reference,
            Some(json!({"reference": "Patient/2"}))
        );
    }

    #[test]
    fn absent_incoming_launch_context_preserves_existing() {
        let existing = QuestionnaireContext {
            launch_context: Some(vec![entry("patient", "Patient/1")]),
            ..Default::default()
        };
        let incoming = QuestionnaireContext {
            subject: Some(json!({"reference": "Patient/1"})),
            ..Default::default()
        };
        let merged = merge_context(Some(&existing), Some(incoming)).unwrap();
        assert_eq!(merged.launch_context, existing.launch_context);
    }

    #[test]
    fn inputs_are_not_mutated() {
        let existing = QuestionnaireContext {
            subject: Some(json!({"reference": "Patient/1"})),
            ..Default::default()
        };
        let before = existing.clone();
        let incoming = QuestionnaireContext {
            subject: Some(json!({"reference": "Patient/2"})),
            ..Default::default()
        };
        let _ = merge_context(Some(&existing), Some(incoming));
        assert_eq!(existing, before);
    }
}
