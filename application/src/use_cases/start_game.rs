//! Start Game use case.
//!
//! Asks the server for a new game and opens a local [`GameSession`] seeded
//! with the counters the server reported.

use crate::game_session::GameSession;
use crate::ports::game_transport::{GameTransport, StartGameRequest, TransportError};
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use casefile_domain::StartedGame;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of starting a game.
pub struct StartGameOutput {
    pub started: StartedGame,
    pub game: GameSession,
}

/// Use case for starting a new game.
pub struct StartGameUseCase {
    transport: Arc<dyn GameTransport>,
    transcript: Arc<dyn TranscriptLogger>,
}

impl StartGameUseCase {
    pub fn new(transport: Arc<dyn GameTransport>) -> Self {
        Self {
            transport,
            transcript: Arc::new(NoTranscriptLogger),
        }
    }

    /// Create with a transcript logger.
    pub fn with_transcript_logger(mut self, logger: Arc<dyn TranscriptLogger>) -> Self {
        self.transcript = logger;
        self
    }

    pub async fn execute(
        &self,
        request: StartGameRequest,
    ) -> Result<StartGameOutput, TransportError> {
        let started = match self.transport.start_game(&request).await {
            Ok(started) => started,
            Err(e) => {
                warn!("Failed to start case {}: {}", request.case_index, e);
                return Err(e);
            }
        };

        info!(
            "Started game {} ({}, {} characters)",
            started.session_id,
            started.case.title,
            started.case.characters.len()
        );
        self.transcript.log(TranscriptEvent::new(
            "game_started",
            json!({
                "session_id": started.session_id,
                "case_index": request.case_index,
                "case_title": started.case.title,
                "max_rounds": started.game_state.max_rounds,
            }),
        ));

        let game = GameSession::from_summary(&started.summary());
        Ok(StartGameOutput { started, game })
    }

    /// Start a new game in place of `previous`.
    ///
    /// The previous game is torn down first, so its in-flight streams stop
    /// before the new game exists.
    pub async fn restart(
        &self,
        previous: &GameSession,
        request: StartGameRequest,
    ) -> Result<StartGameOutput, TransportError> {
        info!("Abandoning game {}", previous.session_id());
        previous.teardown();
        self.execute(request).await
    }
}
