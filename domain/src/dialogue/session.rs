//! The dialogue stream state machine.

use crate::core::error::DomainError;
use crate::core::text_slot::TextSlot;
use crate::dialogue::conversation::ConversationEntry;
use crate::event::dialogue::DialogueEvent;
use crate::evidence::item::EvidenceItem;
use crate::game::progress::CaseProgress;
use crate::round::tracker::RoundReport;
use serde::Serialize;

/// Lifecycle of a [`DialogueStreamSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DialogueStatus {
    Idle,
    Streaming,
    Finalized,
    Errored { message: String },
}

impl DialogueStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DialogueStatus::Finalized | DialogueStatus::Errored { .. })
    }
}

/// Why an event left the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueIgnore {
    /// The session already finalized or errored.
    Terminal,
    /// A chunk arrived after the answer was closed.
    AnswerFinalized,
    /// The evidence name is already in the ledger.
    DuplicateEvidence,
    UnknownEvent,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueUpdate {
    Started,
    Appended,
    AnswerComplete,
    /// First reveal of this evidence in the game.
    EvidenceRevealed(EvidenceItem),
    Completed(RoundReport),
    Failed(String),
    Ignored(DialogueIgnore),
}

/// Read-only copy of a dialogue for observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogueSnapshot {
    pub character_name: String,
    pub question: String,
    pub answer: TextSlot,
    pub status: DialogueStatus,
}

/// One question to one character and the streamed answer.
///
/// Case-wide state (evidence, rounds, conversation history) is not owned
/// here; it is passed into [`apply`](Self::apply) by the game that owns it.
#[derive(Debug, Clone)]
pub struct DialogueStreamSession {
    character_name: String,
    question: String,
    answer: TextSlot,
    status: DialogueStatus,
}

impl DialogueStreamSession {
    pub fn new(
        character_name: impl Into<String>,
        question: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(DomainError::EmptyQuestion);
        }
        Ok(Self {
            character_name: character_name.into(),
            question,
            answer: TextSlot::streaming(),
            status: DialogueStatus::Idle,
        })
    }

    pub fn character_name(&self) -> &str {
        &self.character_name
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &TextSlot {
        &self.answer
    }

    pub fn status(&self) -> &DialogueStatus {
        &self.status
    }

    /// Enter `Streaming` once the transport has opened.
    pub fn begin(&mut self) -> bool {
        if self.status != DialogueStatus::Idle {
            return false;
        }
        self.status = DialogueStatus::Streaming;
        true
    }

    /// Mark the exchange failed for a reason outside the event stream.
    /// The partial answer is kept for display but never logged.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = DialogueStatus::Errored {
            message: message.into(),
        };
        true
    }

    pub fn snapshot(&self) -> DialogueSnapshot {
        DialogueSnapshot {
            character_name: self.character_name.clone(),
            question: self.question.clone(),
            answer: self.answer.clone(),
            status: self.status.clone(),
        }
    }

    /// Apply one event, updating `progress` for evidence, rounds, and the
    /// conversation log.
    pub fn apply(&mut self, event: DialogueEvent, progress: &mut CaseProgress) -> DialogueUpdate {
        if self.status.is_terminal() {
            return DialogueUpdate::Ignored(DialogueIgnore::Terminal);
        }
        self.begin();

        match event {
            DialogueEvent::Start { .. } => DialogueUpdate::Started,
            DialogueEvent::Chunk { content } => {
                if self.answer.append(&content) {
                    DialogueUpdate::Appended
                } else {
                    DialogueUpdate::Ignored(DialogueIgnore::AnswerFinalized)
                }
            }
            DialogueEvent::ResponseComplete => {
                self.answer.finalize();
                DialogueUpdate::AnswerComplete
            }
            DialogueEvent::EvidenceRevealed { evidence } => {
                if progress.ledger.reveal(evidence.clone()) {
                    DialogueUpdate::EvidenceRevealed(evidence)
                } else {
                    DialogueUpdate::Ignored(DialogueIgnore::DuplicateEvidence)
                }
            }
            DialogueEvent::Complete {
                round_number,
                rounds_exhausted,
                remaining_rounds,
            } => {
                self.answer.finalize();
                let report =
                    progress
                        .rounds
                        .apply_completion(round_number, rounds_exhausted, remaining_rounds);
                progress.conversations.record(
                    &self.character_name,
                    ConversationEntry {
                        question: self.question.clone(),
                        answer: self.answer.text().to_string(),
                        round_number: report.current,
                    },
                );
                self.status = DialogueStatus::Finalized;
                DialogueUpdate::Completed(report)
            }
            DialogueEvent::Error { message } => {
                self.status = DialogueStatus::Errored {
                    message: message.clone(),
                };
                DialogueUpdate::Failed(message)
            }
            DialogueEvent::Unknown => DialogueUpdate::Ignored(DialogueIgnore::UnknownEvent),
        }
    }
}
