//! Submit Accusation use case.
//!
//! Accuses a suspect and consumes the trial stream through a fresh
//! [`TrialSession`]. Each submission gets its own session; nothing carries
//! over between accusations.

use crate::game_session::GameSession;
use crate::ports::game_transport::{AccusationRequest, GameTransport};
use crate::ports::stream_observer::StreamObserver;
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use crate::stream::{StreamItem, events};
use crate::use_cases::shared::{STREAM_SEVERED, StreamError};
use casefile_domain::{
    DomainError, IgnoreReason, TrialEvent, TrialSession, TrialSnapshot, TrialUpdate,
};
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Input for the [`SubmitAccusationUseCase`].
#[derive(Debug, Clone)]
pub struct SubmitAccusationInput {
    pub accused_name: String,
    pub reasoning: String,
}

impl SubmitAccusationInput {
    pub fn new(accused_name: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            accused_name: accused_name.into(),
            reasoning: reasoning.into(),
        }
    }
}

/// A trial that ended without `complete`.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{error}")]
pub struct TrialFailure {
    pub error: StreamError,
    /// The trial as far as it got.
    pub snapshot: TrialSnapshot,
}

/// Use case for submitting an accusation.
pub struct SubmitAccusationUseCase {
    transport: Arc<dyn GameTransport>,
    transcript: Arc<dyn TranscriptLogger>,
}

impl SubmitAccusationUseCase {
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

    /// Submit the accusation and consume the trial until `complete` or
    /// `error`.
    ///
    /// On failure the returned [`TrialFailure`] carries the trial as far as
    /// it got, so callers can still show the defense and testimonies that
    /// arrived before the error.
    pub async fn execute(
        &self,
        game: &GameSession,
        input: SubmitAccusationInput,
        observer: &dyn StreamObserver,
    ) -> Result<TrialSnapshot, TrialFailure> {
        let mut session = TrialSession::new(&input.accused_name);
        match self.run(game, &input, observer, &mut session).await {
            Ok(()) => Ok(session.snapshot()),
            Err(error) => Err(TrialFailure {
                error,
                snapshot: session.snapshot(),
            }),
        }
    }

    async fn run(
        &self,
        game: &GameSession,
        input: &SubmitAccusationInput,
        observer: &dyn StreamObserver,
        session: &mut TrialSession,
    ) -> Result<(), StreamError> {
        if input.accused_name.trim().is_empty() {
            return Err(DomainError::EmptyAccusation.into());
        }

        let cancellation = game.cancellation().clone();

        info!("Accusing {}", input.accused_name);
        self.transcript.log(TranscriptEvent::new(
            "accusation_submitted",
            json!({
                "session_id": game.session_id(),
                "accused_name": input.accused_name,
                "reasoning": input.reasoning,
            }),
        ));

        let request = AccusationRequest {
            session_id: game.session_id().to_string(),
            accused_name: input.accused_name.clone(),
            reasoning: input.reasoning.clone(),
        };

        let opened = tokio::select! {
            biased;
            _ = cancellation.cancelled() => {
                return Err(StreamError::Cancelled);
            }
            opened = self.transport.open_trial_stream(&request) => opened,
        };
        let body = match opened {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to open trial stream: {}", e);
                session.fail(e.to_string());
                self.log_failure(game, session, &e.to_string());
                return Err(e.into());
            }
        };

        let mut stream = events::<TrialEvent>(body);

        loop {
            if cancellation.is_cancelled() {
                return Err(StreamError::Cancelled);
            }

            let item = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    debug!("Trial stream for {} cancelled", input.accused_name);
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
                    warn!("Trial stream failed: {}", e);
                    session.fail(e.to_string());
                    self.log_failure(game, session, &e.to_string());
                    return Err(e.into());
                }
                None => {
                    warn!("Trial stream severed");
                    session.fail(STREAM_SEVERED);
                    self.log_failure(game, session, STREAM_SEVERED);
                    return Err(StreamError::Severed);
                }
            };

            trace!("Trial event: {}", event.kind());
            let update = session.apply(event);

            match &update {
                TrialUpdate::Applied(phase) => trace!("Trial phase: {}", phase),
                TrialUpdate::Reindexed {
                    name,
                    wire_index,
                    local_index,
                } => {
                    warn!(
                        "Server index {} for {} differs from local index {}; using local",
                        wire_index, name, local_index
                    );
                }
                TrialUpdate::Ignored(IgnoreReason::UnknownEvent) => {
                    debug!("Ignoring unknown trial event");
                }
                TrialUpdate::Ignored(reason) => trace!("Trial event ignored: {:?}", reason),
                TrialUpdate::Completed | TrialUpdate::Failed(_) => {}
            }

            observer.on_trial_update(session, &update);

            match update {
                TrialUpdate::Completed => {
                    let state = session.state();
                    info!(
                        "Trial of {} complete (verdict: {:?}, correct: {:?})",
                        input.accused_name,
                        state.verdict.map(|v| v.upheld()),
                        state.correctness.map(|c| c.is_correct())
                    );
                    self.transcript.log(TranscriptEvent::new(
                        "trial_complete",
                        json!({
                            "session_id": game.session_id(),
                            "accused_name": input.accused_name,
                            "vote_summary": state.vote_summary,
                            "final_verdict": state.verdict.map(|v| v.upheld()),
                            "is_correct": state.correctness.map(|c| c.is_correct()),
                            "outcome": state.outcome,
                        }),
                    ));
                    return Ok(());
                }
                TrialUpdate::Failed(message) => {
                    warn!("Server error during trial: {}", message);
                    self.log_failure(game, session, &message);
                    return Err(StreamError::Server(message));
                }
                _ => {}
            }
        }
    }

    fn log_failure(&self, game: &GameSession, session: &TrialSession, message: &str) {
        self.transcript.log(TranscriptEvent::new(
            "trial_failed",
            json!({
                "session_id": game.session_id(),
                "accused_name": session.accused_name(),
                "phase": session.state().phase,
                "message": message,
            }),
        ));
    }
}
