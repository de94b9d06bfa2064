//! Session lifecycle phases and the minimum-phase table.

use formwire_contract::SwmMessageType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered lifecycle phase of a renderer session.
///
/// Ordering is significant: a message type gated at phase `R` is accepted
/// whenever the current phase is `>= R`. `Disabled` sorts below everything
/// and is the abort state.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(i8)]
pub enum Phase {
    Disabled = -1,
    #[default]
    AwaitingHandshake = 0,
    AwaitingConfig = 1,
    AwaitingContext = 2,
    AwaitingQuestionnaire = 3,
    Ready = 4,
}

impl Phase {
    /// Phase name as used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::AwaitingHandshake => "AwaitingHandshake",
            Self::AwaitingConfig => "AwaitingConfig",
            Self::AwaitingContext => "AwaitingContext",
            Self::AwaitingQuestionnaire => "AwaitingQuestionnaire",
            Self::Ready => "Ready",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Minimum phase required to process a message type.
///
/// `None` means the type is never phase-gated (`status.handshake` and the
/// renderer-originated UI events).
pub fn required_phase(message_type: SwmMessageType) -> Option<Phase> {
    match message_type {
        SwmMessageType::Configure => Some(Phase::AwaitingConfig),
        SwmMessageType::ConfigureContext => Some(Phase::AwaitingContext),
        SwmMessageType::DisplayQuestionnaire => Some(Phase::AwaitingQuestionnaire),
        SwmMessageType::DisplayQuestionnaireResponse => Some(Phase::AwaitingQuestionnaire),
        SwmMessageType::RequestCurrentQuestionnaireResponse => Some(Phase::Ready),
        SwmMessageType::RequestExtract => Some(Phase::Ready),
        SwmMessageType::Handshake
        | SwmMessageType::UiChangedQuestionnaireResponse
        | SwmMessageType::UiChangedFocus => None,
    }
}

/// Owns the current phase and enforces monotone advancement.
///
/// All other components read the phase through [`PhaseTracker::current`] and
/// write it only through [`PhaseTracker::advance`]. Illegal requests are
/// absorbed as no-ops, never rejected with an error.
#[derive(Debug, Clone, Default)]
pub struct PhaseTracker {
    current: Phase,
}

impl PhaseTracker {
    /// Tracker starting at [`Phase::AwaitingHandshake`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn current(&self) -> Phase {
        self.current
    }

    /// Move to `next` if it is ahead of the current phase.
    ///
    /// `Disabled` is reachable from any phase and sticky: once disabled, no
    /// further transition applies.
    pub fn advance(&mut self, next: Phase) {
        if self.current == Phase::Disabled {
            return;
        }
        if next == Phase::Disabled {
            tracing::debug!(from = %self.current, "session disabled");
            self.current = Phase::Disabled;
            return;
        }
        if self.current >= next {
            return;
        }
        tracing::debug!(from = %self.current, to = %next, "phase advanced");
        self.current = next;
    }
}
