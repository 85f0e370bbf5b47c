//! Domain layer for casefile
//!
//! This crate holds the streaming game-client core: framing and parsing of
//! server event streams, and the state machines that consume them. It has
//! no dependencies on transport, async runtime, or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Streams
//!
//! The server answers questions and accusations with line-oriented event
//! streams. [`StreamFramer`] turns arbitrary byte fragments into lines and
//! [`parse_event_line`] turns lines into typed events.
//!
//! ## Sessions
//!
//! - **Dialogue**: one question to one character, answered by a
//!   [`DialogueStreamSession`] that updates the game's [`CaseProgress`]
//! - **Trial**: one accusation, consumed by a [`TrialSession`] that resolves
//!   witnesses and voters through append-only registries

pub mod core;
pub mod dialogue;
pub mod event;
pub mod evidence;
pub mod game;
pub mod round;
pub mod stream;
pub mod suggestion;
pub mod trial;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    text_slot::{STREAMING_CURSOR, SlotState, TextSlot},
};
pub use dialogue::{
    conversation::{ConversationEntry, ConversationLog},
    session::{DialogueIgnore, DialogueSnapshot, DialogueStatus, DialogueStreamSession, DialogueUpdate},
};
pub use event::{dialogue::DialogueEvent, trial::TrialEvent};
pub use evidence::{
    item::{EvidenceItem, EvidenceType},
    ledger::EvidenceLedger,
};
pub use game::{
    case::{CaseBrief, CharacterBrief, GameCounters, Hint, StartedGame},
    progress::CaseProgress,
    state::{GameStateSummary, RecordedExchange},
};
pub use round::tracker::{DEFAULT_MAX_ROUNDS, QuestionRoundTracker, RoundReport};
pub use stream::{
    framer::{EVENT_PREFIX, StreamFramer},
    parser::{ParsedLine, parse_event_line},
};
pub use suggestion::{SuggestionMessage, SuggestionRequest};
pub use trial::{
    record::{Ballot, TestimonyRecord, TrialOutcome, VoteRecord, VoteTally},
    registry::{ParticipantRegistry, Registration},
    session::{IgnoreReason, TrialSession, TrialSnapshot, TrialStatus, TrialUpdate},
    state::{Correctness, Evaluation, Testimony, TrialPhase, TrialState, TrialStep, Verdict, VoteEntry},
};
