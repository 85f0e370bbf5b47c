//! Application layer for casefile
//!
//! This crate contains use cases, port definitions, and the async adapters
//! that turn response bodies into typed events. It depends only on the
//! domain layer.

pub mod game_session;
pub mod ports;
pub mod stream;
pub mod use_cases;

// Re-export commonly used types
pub use game_session::{GameSession, InFlightQuestion};
pub use ports::{
    game_transport::{
        AccusationRequest, ByteStream, GameTransport, HintRequest, QuestionRequest,
        StartGameRequest, TransportError,
    },
    stream_observer::{NoObserver, StreamObserver},
    transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger},
};
pub use stream::{StreamItem, events, lines};
pub use use_cases::ask_question::{AskQuestionInput, AskQuestionOutput, AskQuestionUseCase};
pub use use_cases::request_hint::RequestHintUseCase;
pub use use_cases::shared::StreamError;
pub use use_cases::start_game::{StartGameOutput, StartGameUseCase};
pub use use_cases::submit_accusation::{
    SubmitAccusationInput, SubmitAccusationUseCase, TrialFailure,
};
