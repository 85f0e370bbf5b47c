//! Case progress owned by one game.

use crate::dialogue::conversation::ConversationLog;
use crate::evidence::ledger::EvidenceLedger;
use crate::round::tracker::QuestionRoundTracker;
use serde::Serialize;

/// What the player has learned so far in one game.
///
/// Dialogue sessions borrow this mutably while they apply events; nothing
/// else writes to it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CaseProgress {
    pub ledger: EvidenceLedger,
    pub rounds: QuestionRoundTracker,
    pub conversations: ConversationLog,
}

impl CaseProgress {
    pub fn new(max_rounds: u32) -> Self {
        Self {
            ledger: EvidenceLedger::new(),
            rounds: QuestionRoundTracker::new(max_rounds),
            conversations: ConversationLog::new(),
        }
    }

    pub fn with_rounds(rounds: QuestionRoundTracker) -> Self {
        Self {
            rounds,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_progress_is_empty() {
        let progress = CaseProgress::new(10);
        assert!(progress.ledger.is_empty());
        assert!(progress.conversations.is_empty());
        assert_eq!(progress.rounds.max(), 10);
        assert!(progress.rounds.can_ask());
    }
}
