//! Per-game state and lifecycle.

use casefile_domain::{CaseProgress, DomainError, GameStateSummary, QuestionRoundTracker};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Everything owned by one running game.
///
/// Dialogue streams to different characters may run at once; they share the
/// case progress through a short-lived lock that is never held across an
/// await point. At most one question per character is in flight.
pub struct GameSession {
    session_id: String,
    progress: Mutex<CaseProgress>,
    in_flight: Mutex<HashSet<String>>,
    cancellation: CancellationToken,
}

impl GameSession {
    pub fn new(session_id: impl Into<String>, max_rounds: u32) -> Self {
        Self::with_progress_state(session_id.into(), CaseProgress::new(max_rounds))
    }

    /// Resume a game from the server's summary: its round counter and the
    /// exchanges it already remembers.
    pub fn from_summary(summary: &GameStateSummary) -> Self {
        let progress = CaseProgress {
            conversations: summary.conversation_log(),
            ..CaseProgress::with_rounds(summary.round_tracker())
        };
        Self::with_progress_state(summary.session_id.clone(), progress)
    }

    fn with_progress_state(session_id: String, progress: CaseProgress) -> Self {
        Self {
            session_id,
            progress: Mutex::new(progress),
            in_flight: Mutex::new(HashSet::new()),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Token cancelled by [`teardown`](Self::teardown).
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Run `f` with exclusive access to the case progress.
    pub fn with_progress<R>(&self, f: impl FnOnce(&mut CaseProgress) -> R) -> R {
        let mut progress = lock(&self.progress);
        f(&mut *progress)
    }

    /// Copy of the current case progress.
    pub fn progress(&self) -> CaseProgress {
        lock(&self.progress).clone()
    }

    pub fn rounds(&self) -> QuestionRoundTracker {
        lock(&self.progress).rounds.clone()
    }

    /// Reserve `character_name` for a new question.
    ///
    /// The reservation is released when the returned guard drops.
    pub fn begin_question(&self, character_name: &str) -> Result<InFlightQuestion<'_>, DomainError> {
        let mut in_flight = lock(&self.in_flight);
        if !in_flight.insert(character_name.to_string()) {
            return Err(DomainError::QuestionInFlight(character_name.to_string()));
        }
        debug!("Question to {} is now in flight", character_name);
        Ok(InFlightQuestion {
            session: self,
            character_name: character_name.to_string(),
        })
    }

    pub fn is_in_flight(&self, character_name: &str) -> bool {
        lock(&self.in_flight).contains(character_name)
    }

    /// Stop every stream consuming on behalf of this game.
    pub fn teardown(&self) {
        debug!("Tearing down game session {}", self.session_id);
        self.cancellation.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Reservation of a character for one question.
pub struct InFlightQuestion<'a> {
    session: &'a GameSession,
    character_name: String,
}

impl InFlightQuestion<'_> {
    pub fn character_name(&self) -> &str {
        &self.character_name
    }
}

impl Drop for InFlightQuestion<'_> {
    fn drop(&mut self) {
        lock(&self.session.in_flight).remove(&self.character_name);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
