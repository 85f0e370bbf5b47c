//! Events of the question/answer stream.

use crate::evidence::item::EvidenceItem;
use serde::{Deserialize, Serialize};

/// One event on a dialogue stream, tagged by its `type` field.
///
/// ```
/// use casefile_domain::event::dialogue::DialogueEvent;
///
/// let event: DialogueEvent =
///     serde_json::from_str(r#"{"type":"chunk","content":"他"}"#).unwrap();
/// assert_eq!(event, DialogueEvent::Chunk { content: "他".into() });
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogueEvent {
    /// Stream opened; echoes the character being questioned.
    Start {
        #[serde(default)]
        character_name: Option<String>,
    },
    /// A fragment of the answer text.
    Chunk { content: String },
    /// The answer text is complete; bookkeeping events may still follow.
    ResponseComplete,
    /// The question uncovered a piece of evidence.
    EvidenceRevealed { evidence: EvidenceItem },
    /// Terminal success, carrying the authoritative round counters.
    Complete {
        round_number: u32,
        rounds_exhausted: bool,
        #[serde(default)]
        remaining_rounds: Option<i64>,
    },
    /// Terminal failure reported by the server.
    Error {
        #[serde(default)]
        message: String,
    },
    /// Any tag this client does not handle.
    #[serde(other)]
    Unknown,
}

impl DialogueEvent {
    /// Wire name of the event type.
    pub fn kind(&self) -> &'static str {
        match self {
            DialogueEvent::Start { .. } => "start",
            DialogueEvent::Chunk { .. } => "chunk",
            DialogueEvent::ResponseComplete => "response_complete",
            DialogueEvent::EvidenceRevealed { .. } => "evidence_revealed",
            DialogueEvent::Complete { .. } => "complete",
            DialogueEvent::Error { .. } => "error",
            DialogueEvent::Unknown => "unknown",
        }
    }

    /// Returns true for `complete` and `error`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DialogueEvent::Complete { .. } | DialogueEvent::Error { .. }
        )
    }
}
