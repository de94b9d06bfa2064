//! Closed registry of SDC SMART Web Messaging message types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message types this protocol speaks.
///
/// Parsing is deliberately partial: wire strings outside this set stay
/// unparsed so the receiver can ignore them as forward-compatible
/// extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwmMessageType {
    /// Version/identity negotiation; always permitted.
    #[serde(rename = "status.handshake")]
    Handshake,
    /// Host supplies renderer configuration.
    #[serde(rename = "sdc.configure")]
    Configure,
    /// Host supplies the questionnaire launch context.
    #[serde(rename = "sdc.configureContext")]
    ConfigureContext,
    /// Host asks the renderer to display a questionnaire.
    #[serde(rename = "sdc.displayQuestionnaire")]
    DisplayQuestionnaire,
    /// Host asks the renderer to display an existing response.
    #[serde(rename = "sdc.displayQuestionnaireResponse")]
    DisplayQuestionnaireResponse,
    /// Host asks for the response as currently filled in.
    #[serde(rename = "sdc.requestCurrentQuestionnaireResponse")]
    RequestCurrentQuestionnaireResponse,
    /// Host asks for structured data extraction.
    #[serde(rename = "sdc.requestExtract")]
    RequestExtract,
    /// Renderer event: the in-progress response changed.
    #[serde(rename = "sdc.ui.changedQuestionnaireResponse")]
    UiChangedQuestionnaireResponse,
    /// Renderer event: input focus moved.
    #[serde(rename = "sdc.ui.changedFocus")]
    UiChangedFocus,
}

impl SwmMessageType {
    /// Wire name of this message type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Handshake => "status.handshake",
            Self::Configure => "sdc.configure",
            Self::ConfigureContext => "sdc.configureContext",
            Self::DisplayQuestionnaire => "sdc.displayQuestionnaire",
            Self::DisplayQuestionnaireResponse => "sdc.displayQuestionnaireResponse",
            Self::RequestCurrentQuestionnaireResponse => "sdc.requestCurrentQuestionnaireResponse",
            Self::RequestExtract => "sdc.requestExtract",
            Self::UiChangedQuestionnaireResponse => "sdc.ui.changedQuestionnaireResponse",
            Self::UiChangedFocus => "sdc.ui.changedFocus",
        }
    }

    /// Parse a wire name. `None` for anything outside the registry.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "status.handshake" => Some(Self::Handshake),
            "sdc.configure" => Some(Self::Configure),
            "sdc.configureContext" => Some(Self::ConfigureContext),
            "sdc.displayQuestionnaire" => Some(Self::DisplayQuestionnaire),
            "sdc.displayQuestionnaireResponse" => Some(Self::DisplayQuestionnaireResponse),
            "sdc.requestCurrentQuestionnaireResponse" => {
                Some(Self::RequestCurrentQuestionnaireResponse)
            }
            "sdc.requestExtract" => Some(Self::RequestExtract),
            "sdc.ui.changedQuestionnaireResponse" => Some(Self::UiChangedQuestionnaireResponse),
            "sdc.ui.changedFocus" => Some(Self::UiChangedFocus),
            _ => None,
        }
    }
}

impl fmt::Display for SwmMessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inverts_as_str() {
        let all = [
            SwmMessageType::Handshake,
            SwmMessageType::Configure,
            SwmMessageType::ConfigureContext,
            SwmMessageType::DisplayQuestionnaire,
            SwmMessageType::DisplayQuestionnaireResponse,
            SwmMessageType::RequestCurrentQuestionnaireResponse,
            SwmMessageType::RequestExtract,
            SwmMessageType::UiChangedQuestionnaireResponse,
            SwmMessageType::UiChangedFocus,
        ];
        for message_type in all {
            assert_eq!(SwmMessageType::parse(message_type.as_str()), Some(message_type));
        }
    }

    #[test]
    fn unknown_names_stay_unparsed() {
        assert_eq!(SwmMessageType::parse("sdc.somethingNew"), None);
        assert_eq!(SwmMessageType::parse(""), None);
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&SwmMessageType::ConfigureContext).unwrap();
        assert_eq!(json, "\"sdc.configureContext\"");
        let back: SwmMessageType = serde_json::from_str("\"sdc.requestExtract\"").unwrap();
        assert_eq!(back, SwmMessageType::RequestExtract);
    }
}
