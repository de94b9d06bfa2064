//! End-to-end lifecycle: handshake through display to UI notifications.
#![allow(missing_docs)]

mod common;

use common::{questionnaire, questionnaire_response, Harness};
use formwire_renderer::Phase;
use serde_json::json;

#[tokio::test]
async fn full_lifecycle_reaches_ready_with_stored_state() {
    let mut harness = Harness::new();

    let handshake = harness
        .request("status.handshake", json!({"fhirVersion": "4.0.1"}))
        .await;
    assert_eq!(handshake.payload["application"]["name"], "Test Renderer");
    assert_eq!(handshake.payload["capabilities"]["extraction"], true);
    assert_eq!(harness.session.phase(), Phase::AwaitingConfig);

    let configure = harness
        .request(
            "sdc.configure",
            json!({"terminologyServer": "https://tx.example.org/fhir"}),
        )
        .await;
    assert_eq!(configure.payload, json!({"status": "success"}));
    assert_eq!(harness.session.phase(), Phase::AwaitingContext);

    let context = harness
        .request(
            "sdc.configureContext",
            json!({"context": {"subject": {"reference": "Patient/1"}}}),
        )
        .await;
    assert_eq!(context.payload, json!({"status": "success"}));
    assert_eq!(harness.session.phase(), Phase::AwaitingQuestionnaire);

    let display = harness
        .request(
            "sdc.displayQuestionnaire",
            json!({"questionnaire": questionnaire("q1")}),
        )
        .await;
    assert_eq!(display.payload, json!({"status": "success"}));

    let snapshot = harness.session.snapshot();
    assert_eq!(snapshot.phase, Phase::Ready);
    assert_eq!(snapshot.questionnaire.as_ref().unwrap()["id"], "q1");
    assert_eq!(
        snapshot.context.as_ref().unwrap().subject,
        Some(json!({"reference": "Patient/1"}))
    );
    assert_eq!(snapshot.fhir_version.as_deref(), Some("4.0.1"));
    assert_eq!(
        snapshot.config.as_ref().unwrap()["terminologyServer"],
        "https://tx.example.org/fhir"
    );
    assert!(harness.errors.errors().is_empty());
}

#[tokio::test]
async fn handshake_records_fhir_version_only_when_string() {
    let mut harness = Harness::new();
    harness.request("status.handshake", json!({"fhirVersion": 4})).await;
    assert_eq!(harness.session.snapshot().fhir_version, None);

    // Handshake stays permitted later and never regresses the phase.
    harness.ready().await;
    harness.request("status.handshake", json!({"fhirVersion": "4.0.1"})).await;
    assert_eq!(harness.session.phase(), Phase::Ready);
    assert_eq!(harness.session.snapshot().fhir_version.as_deref(), Some("4.0.1"));
}

#[tokio::test]
async fn configure_context_replaces_previous_context() {
    let mut harness = Harness::new();
    harness.request("status.handshake", json!({})).await;
    harness.request("sdc.configure", json!({})).await;
    harness
        .request(
            "sdc.configureContext",
            json!({"context": {
                "subject": {"reference": "Patient/1"},
                "launchContext": [{"name": "patient", "contentReference": {"reference": "Patient/1"}}]
            }}),
        )
        .await;

    // A later configureContext is authoritative, not an overlay.
    harness
        .request(
            "sdc.configureContext",
            json!({"context": {"encounter": {"reference": "Encounter/5"}}}),
        )
        .await;

    let context = harness.session.snapshot().context.unwrap();
    assert_eq!(context.encounter, Some(json!({"reference": "Encounter/5"})));
    assert_eq!(context.subject, None);
    assert_eq!(context.launch_context, None);
}

#[tokio::test]
async fn display_questionnaire_merges_context_instead_of_replacing() {
    let mut harness = Harness::new();
    harness.ready().await;
    assert_eq!(
        harness.session.snapshot().context.unwrap().subject,
        Some(json!({"reference": "Patient/1"}))
    );

    harness
        .request(
            "sdc.displayQuestionnaire",
            json!({
                "questionnaire": questionnaire("q2"),
                "context": {"encounter": {"reference": "Encounter/5"}}
            }),
        )
        .await;

    let context = harness.session.snapshot().context.unwrap();
    assert_eq!(context.subject, Some(json!({"reference": "Patient/1"})));
    assert_eq!(context.encounter, Some(json!({"reference": "Encounter/5"})));
    assert_eq!(harness.session.snapshot().questionnaire.unwrap()["id"], "q2");
}

#[tokio::test]
async fn display_without_response_clears_previous_response() {
    let mut harness = Harness::new();
    harness
        .ready_with(json!({
            "questionnaire": questionnaire("q1"),
            "questionnaireResponse": questionnaire_response("in-progress")
        }))
        .await;
    assert!(harness.session.snapshot().questionnaire_response.is_some());

    harness
        .request("sdc.displayQuestionnaire", json!({"questionnaire": questionnaire("q2")}))
        .await;
    assert!(harness.session.snapshot().questionnaire_response.is_none());
}

#[tokio::test]
async fn bare_questionnaire_payload_is_accepted() {
    let mut harness = Harness::new();
    harness.request("status.handshake", json!({})).await;
    harness.request("sdc.configure", json!({})).await;
    harness.request("sdc.configureContext", json!({})).await;

    let display = harness
        .request("sdc.displayQuestionnaire", questionnaire("q-bare"))
        .await;
    assert_eq!(display.payload["status"], "success");
    assert_eq!(harness.session.snapshot().questionnaire.unwrap()["id"], "q-bare");
}

#[tokio::test]
async fn display_questionnaire_response_requires_a_questionnaire_somewhere() {
    let mut harness = Harness::new();
    harness.ready().await;

    // Bare response, questionnaire already known from the display step.
    let reply = harness
        .request(
            "sdc.displayQuestionnaireResponse",
            questionnaire_response("completed"),
        )
        .await;
    assert_eq!(reply.payload, json!({"status": "success"}));
    assert_eq!(
        harness.session.snapshot().questionnaire_response.unwrap()["status"],
        "completed"
    );

    // Wrapper form carrying its own questionnaire replaces the stored one.
    let reply = harness
        .request(
            "sdc.displayQuestionnaireResponse",
            json!({
                "questionnaire": questionnaire("q3"),
                "questionnaireResponse": questionnaire_response("in-progress")
            }),
        )
        .await;
    assert_eq!(reply.payload["status"], "success");
    assert_eq!(harness.session.snapshot().questionnaire.unwrap()["id"], "q3");
}

#[tokio::test]
async fn response_change_notification_updates_state_and_emits_event() {
    let mut harness = Harness::new();
    harness.ready().await;
    harness.sender.take();

    harness
        .session
        .notify_questionnaire_response_changed(questionnaire_response("in-progress"))
        .await
        .unwrap();

    let snapshot = harness.session.snapshot();
    assert_eq!(
        snapshot.questionnaire_response.as_ref().unwrap()["status"],
        "in-progress"
    );

    let sent = harness.sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message_type, "sdc.ui.changedQuestionnaireResponse");
    assert!(!sent[0].is_response());
    assert_eq!(
        sent[0].payload["questionnaireResponse"]["status"],
        "in-progress"
    );
}

#[tokio::test]
async fn focus_notification_forwards_payload_verbatim() {
    let mut harness = Harness::new();
    harness.ready().await;
    harness.sender.take();

    harness
        .session
        .notify_focus_changed(json!({"linkId": "q1"}))
        .await
        .unwrap();

    let sent = harness.sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].message_type, "sdc.ui.changedFocus");
    assert_eq!(sent[0].payload, json!({"linkId": "q1"}));
}
