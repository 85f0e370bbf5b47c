//! Ask Question use case.
//!
//! Sends one question to one character and consumes the answer stream
//! through a [`DialogueStreamSession`], updating the game's evidence, round
//! counter and conversation log as events arrive.

use crate::game_session::GameSession;
use crate::ports::game_transport::{GameTransport, QuestionRequest};
use crate::ports::stream_observer::StreamObserver;
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use crate::stream::{StreamItem, events};
use crate::use_cases::shared::{STREAM_SEVERED, StreamError};
use casefile_domain::{
    DialogueEvent, DialogueIgnore, DialogueSnapshot, DialogueStreamSession, DialogueUpdate,
    DomainError, EvidenceItem, RoundReport,
};
use futures::StreamExt;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Input for the [`AskQuestionUseCase`].
#[derive(Debug, Clone)]
pub struct AskQuestionInput {
    pub character_name: String,
    pub question: String,
}

impl AskQuestionInput {
    pub fn new(character_name: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            character_name: character_name.into(),
            question: question.into(),
        }
    }
}

/// Result of a completed exchange.
#[derive(Debug, Clone, Serialize)]
pub struct AskQuestionOutput {
    pub dialogue: DialogueSnapshot,
    pub round: RoundReport,
    /// Evidence first revealed by this exchange, in reveal order.
    pub revealed: Vec<EvidenceItem>,
}

/// Use case for asking a character a question.
pub struct AskQuestionUseCase {
    transport: Arc<dyn GameTransport>,
    transcript: Arc<dyn TranscriptLogger>,
}

impl Clone for AskQuestionUseCase {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            transcript: self.transcript.clone(),
        }
    }
}

impl AskQuestionUseCase {
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

    /// Ask the question and consume the answer stream until it ends.
    ///
    /// Refuses a second question to a character whose previous answer is
    /// still streaming. Cancelling the game's token stops consumption at the
    /// next read; anything arriving afterwards is discarded.
    pub async fn execute(
        &self,
        game: &GameSession,
        input: AskQuestionInput,
        observer: &dyn StreamObserver,
    ) -> Result<AskQuestionOutput, StreamError> {
        let mut session = DialogueStreamSession::new(&input.character_name, &input.question)?;

        let rounds = game.rounds();
        if !rounds.can_ask() {
            return Err(DomainError::RoundsExhausted {
                current: rounds.current(),
                max: rounds.max(),
            }
            .into());
        }

        let _reservation = game.begin_question(&input.character_name)?;
        let cancellation = game.cancellation().clone();

        info!(
            "Asking {} (round {}/{})",
            input.character_name,
            rounds.current() + 1,
            rounds.max()
        );
        self.transcript.log(TranscriptEvent::new(
            "question_submitted",
            json!({
                "session_id": game.session_id(),
                "character_name": input.character_name,
                "question": input.question,
            }),
        ));

        let request = QuestionRequest {
            session_id: game.session_id().to_string(),
            character_name: input.character_name.clone(),
            question: input.question.clone(),
        };

        let opened = tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                return Err(StreamError::Cancelled);
            }
            opened = self.transport.open_dialogue_stream(&request) => opened,
        };
        let body = match opened {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to open answer stream for {}: {}", input.character_name, e);
                session.fail(e.to_string());
                self.log_failure(game, &session, &e.to_string());
                return Err(e.into());
            }
        };
        session.begin();

        let mut stream = events::<DialogueEvent>(body);
        let mut revealed = Vec::new();

        loop {
            if cancellation.is_cancelled() {
                return Err(StreamError::Cancelled);
            }

            let item = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    debug!("Answer stream for {} cancelled", input.character_name);
                    return Err(StreamError::Cancelled);
                }
                item = stream.next() => item,
            };

            let event = match item {
                Some(Ok(StreamItem::Event(event))) => event,
                Some(Ok(StreamItem::Malformed { payload, reason })) => {
                    warn!("Skipping malformed event line ({}): {}", reason, payload);
                    observer.on_malformed_line(&payload, &reason);
                    continue;
                }
                Some(Err(e)) => {
                    warn!("Answer stream for {} failed: {}", input.character_name, e);
                    session.fail(e.to_string());
                    self.log_failure(game, &session, &e.to_string());
                    return Err(e.into());
                }
                None => {
                    warn!("Answer stream for {} severed", input.character_name);
                    session.fail(STREAM_SEVERED);
                    self.log_failure(game, &session, STREAM_SEVERED);
                    return Err(StreamError::Severed);
                }
            };

            trace!("Dialogue event: {}", event.kind());
            let update = game.with_progress(|progress| session.apply(event, progress));

            match &update {
                DialogueUpdate::EvidenceRevealed(item) => {
                    info!("Evidence revealed: {}", item.name);
                    self.transcript.log(TranscriptEvent::new(
                        "evidence_revealed",
                        json!({
                            "session_id": game.session_id(),
                            "character_name": input.character_name,
                            "evidence": item,
                        }),
                    ));
                    observer.on_evidence_revealed(item);
                    revealed.push(item.clone());
                }
                DialogueUpdate::Completed(report) if report.disagreement => {
                    warn!(
                        "Server round counters disagree at round {} (rounds_exhausted decides: exhausted={})",
                        report.current, report.exhausted
                    );
                }
                DialogueUpdate::Ignored(DialogueIgnore::UnknownEvent) => {
                    debug!("Ignoring unknown dialogue event");
                }
                DialogueUpdate::Ignored(reason) => {
                    trace!("Dialogue event ignored: {:?}", reason);
                }
                _ => {}
            }

            observer.on_dialogue_update(&session, &update);

            match update {
                DialogueUpdate::Completed(round) => {
                    info!(
                        "Answer from {} complete (round {}, exhausted: {})",
                        input.character_name, round.current, round.exhausted
                    );
                    self.transcript.log(TranscriptEvent::new(
                        "answer_complete",
                        json!({
                            "session_id": game.session_id(),
                            "character_name": input.character_name,
                            "question": input.question,
                            "answer": session.answer().text(),
                            "round_number": round.current,
                            "rounds_exhausted": round.exhausted,
                        }),
                    ));
                    return Ok(AskQuestionOutput {
                        dialogue: session.snapshot(),
                        round,
                        revealed,
                    });
                }
                DialogueUpdate::Failed(message) => {
                    warn!("Server error while answering: {}", message);
                    self.log_failure(game, &session, &message);
                    return Err(StreamError::Server(message));
                }
                _ => {}
            }
        }
    }

    fn log_failure(&self, game: &GameSession, session: &DialogueStreamSession, message: &str) {
        self.transcript.log(TranscriptEvent::new(
            "dialogue_failed",
            json!({
                "session_id": game.session_id(),
                "character_name": session.character_name(),
                "message": message,
            }),
        ));
    }
}
