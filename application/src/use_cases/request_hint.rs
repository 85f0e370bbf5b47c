//! Request Hint use case.

use crate::game_session::GameSession;
use crate::ports::game_transport::{GameTransport, HintRequest, TransportError};
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use casefile_domain::Hint;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Use case for spending one of the game's hints.
///
/// The allowance is enforced by the server, which answers `400` once every
/// hint is used; the refusal is returned as a [`TransportError::Status`].
pub struct RequestHintUseCase {
    transport: Arc<dyn GameTransport>,
    transcript: Arc<dyn TranscriptLogger>,
}

impl RequestHintUseCase {
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

    pub async fn execute(&self, game: &GameSession) -> Result<Hint, TransportError> {
        let request = HintRequest {
            session_id: game.session_id().to_string(),
        };
        let hint = match self.transport.request_hint(&request).await {
            Ok(hint) => hint,
            Err(e) => {
                warn!("Hint request for {} refused: {}", game.session_id(), e);
                return Err(e);
            }
        };

        info!(
            "Hint received ({} used, {} remaining)",
            hint.hints_used, hint.hints_remaining
        );
        self.transcript.log(TranscriptEvent::new(
            "hint_received",
            json!({
                "session_id": game.session_id(),
                "hint": hint.hint,
                "hints_used": hint.hints_used,
                "hints_remaining": hint.hints_remaining,
            }),
        ));
        Ok(hint)
    }
}
