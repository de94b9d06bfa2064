//! The renderer session: phase gate, message dispatcher, and session state.

use crate::channel::ChannelBinding;
use crate::messenger::Messenger;
use crate::phase::{required_phase, Phase, PhaseTracker};
use crate::ports::{ChannelError, ErrorSink, ExtractCapability, MessageSender, SessionError};
use crate::state::{SessionSnapshot, SessionState};
use formwire_contract::{
    build_outcome, context_from_payload, is_configure_context_payload, is_configure_payload,
    is_display_questionnaire_payload, is_display_questionnaire_response_payload, is_record,
    merge_context, resolve_questionnaire, resolve_questionnaire_response, ApplicationIdentity,
    ChangedQuestionnaireResponsePayload, CurrentResponseReplyPayload, Envelope,
    HandshakeReplyPayload, HandshakeRequestPayload, IssueCode, IssueSeverity, OutcomeReplyPayload,
    RendererCapabilities, StatusReplyPayload, SwmMessageType,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Static configuration of a renderer session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Identity echoed back in the handshake reply.
    pub application: ApplicationIdentity,
    /// Capabilities advertised in the handshake reply.
    pub capabilities: Option<RendererCapabilities>,
}

impl SessionOptions {
    pub fn new(application: ApplicationIdentity) -> Self {
        Self {
            application,
            capabilities: None,
        }
    }

    /// Set the advertised capabilities.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: RendererCapabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }
}

/// One renderer-side protocol session.
///
/// Message handling is sequential: each inbound envelope is processed to
/// completion before the next, with the single exception of
/// `sdc.requestExtract`, whose externally supplied handler runs on a
/// detached task so slow extractions never stall the session.
pub struct RendererSession {
    options: SessionOptions,
    messenger: Option<Messenger>,
    phase: PhaseTracker,
    state: SessionState,
    error_sink: Option<Arc<dyn ErrorSink>>,
    extract: Option<Arc<dyn ExtractCapability>>,
    handshake_sent: bool,
}

impl RendererSession {
    /// Create a session over the given channel.
    ///
    /// `binding` is `None` when the launch parameters carried no messaging
    /// handle/origin; such a session is disabled by [`Self::bootstrap`].
    pub fn new(
        options: SessionOptions,
        binding: Option<ChannelBinding>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            options,
            messenger: binding.map(|binding| Messenger::new(binding.handle, sender)),
            phase: PhaseTracker::new(),
            state: SessionState::default(),
            error_sink: None,
            extract: None,
            handshake_sent: false,
        }
    }

    /// Attach a local error sink.
    #[must_use]
    pub fn with_error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = Some(sink);
        self
    }

    /// Register the extract capability announced via
    /// `capabilities.extraction`.
    #[must_use]
    pub fn with_extract_capability(mut self, capability: Arc<dyn ExtractCapability>) -> Self {
        self.extract = Some(capability);
        self
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase.current()
    }

    /// Snapshot of the session data.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase.current(),
            questionnaire: self.state.questionnaire.clone(),
            questionnaire_response: self.state.questionnaire_response.clone(),
            context: self.state.context.clone(),
            config: self.state.config.clone(),
            fhir_version: self.state.fhir_version.clone(),
        }
    }

    /// Abort the session. Terminal; a disabled session drops all traffic.
    pub fn disable(&mut self) {
        self.phase.advance(Phase::Disabled);
    }

    /// Open the session: send the renderer's own `status.handshake` request
    /// and move to `AwaitingConfig`, exactly once.
    ///
    /// A session constructed without a channel binding is disabled instead
    /// and the error sink fires.
    pub async fn bootstrap(&mut self) -> Result<(), ChannelError> {
        let Some(messenger) = self.messenger.clone() else {
            if self.phase.current() != Phase::Disabled {
                self.phase.advance(Phase::Disabled);
                self.report(None, "Missing SDC SWM parameters.");
            }
            return Ok(());
        };
        if self.handshake_sent {
            return Ok(());
        }
        messenger
            .send_request(SwmMessageType::Handshake, &HandshakeRequestPayload::default())
            .await?;
        self.phase.advance(Phase::AwaitingConfig);
        self.handshake_sent = true;
        Ok(())
    }

    /// Record the in-progress response and notify the host via
    /// `sdc.ui.changedQuestionnaireResponse`.
    pub async fn notify_questionnaire_response_changed(
        &mut self,
        response: Value,
    ) -> Result<(), ChannelError> {
        self.state.questionnaire_response = Some(response.clone());
        if let Some(messenger) = &self.messenger {
            messenger
                .send_event(
                    SwmMessageType::UiChangedQuestionnaireResponse,
                    &ChangedQuestionnaireResponsePayload {
                        questionnaire_response: response,
                    },
                )
                .await?;
        }
        Ok(())
    }

    /// Forward a host-defined focus descriptor via `sdc.ui.changedFocus`.
    pub async fn notify_focus_changed(&self, payload: Value) -> Result<(), ChannelError> {
        if let Some(messenger) = &self.messenger {
            messenger
                .send_event(SwmMessageType::UiChangedFocus, &payload)
                .await?;
        }
        Ok(())
    }

    /// Handle one inbound envelope: classify, filter, phase-gate, dispatch.
    ///
    /// Responses to the session's own requests, traffic for other messaging
    /// handles, unknown message types, and anything arriving after the
    /// session was disabled are dropped without effect.
    pub async fn handle_message(&mut self, envelope: Envelope) -> Result<(), ChannelError> {
        if envelope.is_response() {
            tracing::debug!(message_type = %envelope.message_type, "ignoring response traffic");
            return Ok(());
        }
        if !self.accepts_handle(envelope.messaging_handle.as_deref()) {
            tracing::warn!(
                message_type = %envelope.message_type,
                "dropping message for a different messaging handle"
            );
            return Ok(());
        }
        if self.phase.current() == Phase::Disabled {
            tracing::warn!(message_type = %envelope.message_type, "session disabled; dropping message");
            return Ok(());
        }
        let Some(message_type) = SwmMessageType::parse(&envelope.message_type) else {
            tracing::debug!(message_type = %envelope.message_type, "ignoring unknown message type");
            return Ok(());
        };
        if let Some(required) = required_phase(message_type) {
            if self.phase.current() < required {
                return self.reject_premature(message_type, &envelope, required).await;
            }
        }
        self.dispatch(message_type, envelope).await
    }

    fn accepts_handle(&self, inbound: Option<&str>) -> bool {
        match (inbound, &self.messenger) {
            (Some(handle), Some(messenger)) => handle == messenger.handle(),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    fn report(&self, message_type: Option<SwmMessageType>, message: impl Into<String>) {
        if let Some(sink) = &self.error_sink {
            sink.report(SessionError {
                phase: self.phase.current(),
                message_type,
                message: message.into(),
            });
        }
    }

    async fn send_response<P: Serialize>(
        &self,
        message_type: SwmMessageType,
        envelope: &Envelope,
        payload: &P,
    ) -> Result<(), ChannelError> {
        if let Some(messenger) = &self.messenger {
            messenger
                .send_response(message_type, &envelope.message_id, payload)
                .await?;
        }
        Ok(())
    }

    /// Status-style rejection: `{status: "error", outcome}` plus the error
    /// sink.
    async fn fail_status(
        &self,
        message_type: SwmMessageType,
        envelope: &Envelope,
        diagnostics: &str,
    ) -> Result<(), ChannelError> {
        self.send_response(
            message_type,
            envelope,
            &StatusReplyPayload::error(build_outcome(
                IssueSeverity::Error,
                IssueCode::Invalid,
                diagnostics,
            )),
        )
        .await?;
        self.report(Some(message_type), diagnostics);
        Ok(())
    }

    /// Outcome-only rejection for query-style requests.
    async fn fail_outcome(
        &self,
        message_type: SwmMessageType,
        envelope: &Envelope,
        code: IssueCode,
        diagnostics: &str,
    ) -> Result<(), ChannelError> {
        self.send_response(
            message_type,
            envelope,
            &OutcomeReplyPayload {
                outcome: build_outcome(IssueSeverity::Error, code, diagnostics),
            },
        )
        .await?;
        self.report(Some(message_type), diagnostics);
        Ok(())
    }

    async fn reject_premature(
        &self,
        message_type: SwmMessageType,
        envelope: &Envelope,
        required: Phase,
    ) -> Result<(), ChannelError> {
        let diagnostics = format!(
            "Unexpected {message_type} while {current}. Expected {required} or later.",
            current = self.phase.current(),
        );
        self.report(Some(message_type), diagnostics.clone());
        match message_type {
            SwmMessageType::Configure
            | SwmMessageType::ConfigureContext
            | SwmMessageType::DisplayQuestionnaire
            | SwmMessageType::DisplayQuestionnaireResponse => {
                self.send_response(
                    message_type,
                    envelope,
                    &StatusReplyPayload::error(build_outcome(
                        IssueSeverity::Error,
                        IssueCode::Invalid,
                        diagnostics,
                    )),
                )
                .await
            }
            SwmMessageType::RequestCurrentQuestionnaireResponse | SwmMessageType::RequestExtract => {
                self.send_response(
                    message_type,
                    envelope,
                    &OutcomeReplyPayload {
                        outcome: build_outcome(IssueSeverity::Error, IssueCode::Invalid, diagnostics),
                    },
                )
                .await
            }
            _ => Ok(()),
        }
    }

    async fn dispatch(
        &mut self,
        message_type: SwmMessageType,
        envelope: Envelope,
    ) -> Result<(), ChannelError> {
        match message_type {
            SwmMessageType::Handshake => self.on_handshake(envelope).await,
            SwmMessageType::Configure => self.on_configure(envelope).await,
            SwmMessageType::ConfigureContext => self.on_configure_context(envelope).await,
            SwmMessageType::DisplayQuestionnaire => self.on_display_questionnaire(envelope).await,
            SwmMessageType::DisplayQuestionnaireResponse => {
                self.on_display_questionnaire_response(envelope).await
            }
            SwmMessageType::RequestCurrentQuestionnaireResponse => {
                self.on_request_current_response(envelope).await
            }
            SwmMessageType::RequestExtract => self.on_request_extract(envelope).await,
            // Renderer-originated events are never dispatched inbound.
            SwmMessageType::UiChangedQuestionnaireResponse | SwmMessageType::UiChangedFocus => {
                tracing::debug!(%message_type, "ignoring renderer-originated event from host");
                Ok(())
            }
        }
    }

    async fn on_handshake(&mut self, envelope: Envelope) -> Result<(), ChannelError> {
        self.state.fhir_version = envelope
            .payload
            .get("fhirVersion")
            .and_then(Value::as_str)
            .map(str::to_string);
        let reply = HandshakeReplyPayload {
            application: self.options.application.clone(),
            capabilities: self.options.capabilities,
        };
        self.send_response(SwmMessageType::Handshake, &envelope, &reply).await?;
        self.phase.advance(Phase::AwaitingConfig);
        Ok(())
    }

    async fn on_configure(&mut self, envelope: Envelope) -> Result<(), ChannelError> {
        if !is_configure_payload(&envelope.payload) {
            return self
                .fail_status(
                    SwmMessageType::Configure,
                    &envelope,
                    "Invalid sdc.configure payload.",
                )
                .await;
        }
        self.state.config = Some(envelope.payload.clone());
        self.phase.advance(Phase::AwaitingContext);
        self.send_response(SwmMessageType::Configure, &envelope, &StatusReplyPayload::success())
            .await
    }

    async fn on_configure_context(&mut self, envelope: Envelope) -> Result<(), ChannelError> {
        if !is_configure_context_payload(&envelope.payload) {
            return self
                .fail_status(
                    SwmMessageType::ConfigureContext,
                    &envelope,
                    "Invalid sdc.configureContext payload.",
                )
                .await;
        }
        // Replace, not merge: this message carries the authoritative context.
        self.state.context = context_from_payload(&envelope.payload);
        self.phase.advance(Phase::AwaitingQuestionnaire);
        self.send_response(
            SwmMessageType::ConfigureContext,
            &envelope,
            &StatusReplyPayload::success(),
        )
        .await
    }

    async fn on_display_questionnaire(&mut self, envelope: Envelope) -> Result<(), ChannelError> {
        if !is_display_questionnaire_payload(&envelope.payload) {
            return self
                .fail_status(
                    SwmMessageType::DisplayQuestionnaire,
                    &envelope,
                    "Invalid sdc.displayQuestionnaire payload.",
                )
                .await;
        }
        let Some(questionnaire) = resolve_questionnaire(&envelope.payload).cloned() else {
            return self
                .fail_status(
                    SwmMessageType::DisplayQuestionnaire,
                    &envelope,
                    "Missing questionnaire in sdc.displayQuestionnaire.",
                )
                .await;
        };
        self.state.context = merge_context(
            self.state.context.as_ref(),
            context_from_payload(&envelope.payload),
        );
        self.state.questionnaire = Some(questionnaire);
        // A display without a response clears any previously shown one.
        self.state.questionnaire_response =
            resolve_questionnaire_response(&envelope.payload).cloned();
        self.phase.advance(Phase::Ready);
        self.send_response(
            SwmMessageType::DisplayQuestionnaire,
            &envelope,
            &StatusReplyPayload::success(),
        )
        .await
    }

    async fn on_display_questionnaire_response(
        &mut self,
        envelope: Envelope,
    ) -> Result<(), ChannelError> {
        if !is_display_questionnaire_response_payload(&envelope.payload) {
            return self
                .fail_status(
                    SwmMessageType::DisplayQuestionnaireResponse,
                    &envelope,
                    "Invalid sdc.displayQuestionnaireResponse payload.",
                )
                .await;
        }
        let Some(response) = resolve_questionnaire_response(&envelope.payload).cloned() else {
            return self
                .fail_status(
                    SwmMessageType::DisplayQuestionnaireResponse,
                    &envelope,
                    "Missing questionnaireResponse in sdc.displayQuestionnaireResponse.",
                )
                .await;
        };
        if let Some(questionnaire) = resolve_questionnaire(&envelope.payload) {
            self.state.questionnaire = Some(questionnaire.clone());
        }
        if self.state.questionnaire.is_none() {
            return self
                .fail_status(
                    SwmMessageType::DisplayQuestionnaireResponse,
                    &envelope,
                    "Questionnaire is required to render QuestionnaireResponse.",
                )
                .await;
        }
        self.state.questionnaire_response = Some(response);
        self.phase.advance(Phase::Ready);
        self.send_response(
            SwmMessageType::DisplayQuestionnaireResponse,
            &envelope,
            &StatusReplyPayload::success(),
        )
        .await
    }

    async fn on_request_current_response(&mut self, envelope: Envelope) -> Result<(), ChannelError> {
        if !is_record(&envelope.payload) {
            return self
                .fail_outcome(
                    SwmMessageType::RequestCurrentQuestionnaireResponse,
                    &envelope,
                    IssueCode::Invalid,
                    "Invalid sdc.requestCurrentQuestionnaireResponse payload.",
                )
                .await;
        }
        match &self.state.questionnaire_response {
            Some(response) => {
                self.send_response(
                    SwmMessageType::RequestCurrentQuestionnaireResponse,
                    &envelope,
                    &CurrentResponseReplyPayload {
                        questionnaire_response: response.clone(),
                    },
                )
                .await
            }
            None => {
                self.fail_outcome(
                    SwmMessageType::RequestCurrentQuestionnaireResponse,
                    &envelope,
                    IssueCode::NotFound,
                    "No QuestionnaireResponse is currently loaded.",
                )
                .await
            }
        }
    }

    async fn on_request_extract(&mut self, envelope: Envelope) -> Result<(), ChannelError> {
        if !is_record(&envelope.payload) {
            return self
                .fail_outcome(
                    SwmMessageType::RequestExtract,
                    &envelope,
                    IssueCode::Invalid,
                    "Invalid sdc.requestExtract payload.",
                )
                .await;
        }
        let Some(capability) = self.extract.clone() else {
            return self
                .fail_outcome(
                    SwmMessageType::RequestExtract,
                    &envelope,
                    IssueCode::NotSupported,
                    "Extract is not implemented in this renderer.",
                )
                .await;
        };
        let Some(messenger) = self.messenger.clone() else {
            return Ok(());
        };
        let sink = self.error_sink.clone();
        let phase = self.phase.current();
        let request_id = envelope.message_id.clone();
        let payload = envelope.payload.clone();
        // Detached: extraction may suspend while the session keeps
        // dispatching; the reply is correlated by id alone, so out-of-order
        // completion is fine.
        tokio::spawn(async move {
            match capability.extract(payload).await {
                Ok(result) => {
                    if let Err(error) = messenger
                        .send_response(SwmMessageType::RequestExtract, &request_id, &result)
                        .await
                    {
                        tracing::warn!(error = %error, "failed to deliver extract response");
                    }
                }
                Err(error) => {
                    let diagnostics = format!("Extract handler failed: {error}");
                    let reply = OutcomeReplyPayload {
                        outcome: build_outcome(
                            IssueSeverity::Error,
                            IssueCode::Exception,
                            diagnostics.clone(),
                        ),
                    };
                    if let Err(error) = messenger
                        .send_response(SwmMessageType::RequestExtract, &request_id, &reply)
                        .await
                    {
                        tracing::warn!(error = %error, "failed to deliver extract error response");
                    }
                    if let Some(sink) = sink {
                        sink.report(SessionError {
                            phase,
                            message_type: Some(SwmMessageType::RequestExtract),
                            message: diagnostics,
                        });
                    }
                }
            }
        });
        Ok(())
    }
}
