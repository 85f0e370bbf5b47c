//! Client-side view of the server's question round counter.

use serde::{Deserialize, Serialize};

/// Default cap on question rounds per game.
pub const DEFAULT_MAX_ROUNDS: u32 = 30;

/// What a dialogue `complete` event did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    /// Round counter after applying the event.
    pub current: u32,
    /// Whether further questions are now refused.
    pub exhausted: bool,
    /// `rounds_exhausted` and `remaining_rounds <= 0` gave different answers.
    pub disagreement: bool,
}

/// Tracks how many question rounds have been used.
///
/// The server numbers rounds; the tracker only mirrors that number and never
/// lets it go backwards. Exhaustion is advisory: the server still enforces
/// the real limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRoundTracker {
    current: u32,
    max: u32,
    #[serde(default)]
    server_exhausted: bool,
}

impl Default for QuestionRoundTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ROUNDS)
    }
}

impl QuestionRoundTracker {
    pub fn new(max: u32) -> Self {
        Self {
            current: 0,
            max,
            server_exhausted: false,
        }
    }

    /// Tracker seeded from a state snapshot fetched from the server.
    pub fn resume(current: u32, max: u32) -> Self {
        Self {
            current,
            max,
            server_exhausted: false,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn can_ask(&self) -> bool {
        !self.is_exhausted()
    }

    pub fn is_exhausted(&self) -> bool {
        self.current >= self.max || self.server_exhausted
    }

    /// Rounds left before the cap, never negative.
    pub fn remaining(&self) -> u32 {
        if self.server_exhausted {
            return 0;
        }
        self.max.saturating_sub(self.current)
    }

    /// Record the server's round number. A lower number than the one
    /// already seen is ignored.
    pub fn record_round_number(&mut self, round_number: u32) {
        self.current = self.current.max(round_number);
    }

    /// Apply the counters of a dialogue `complete` event.
    ///
    /// `rounds_exhausted` decides; `remaining_rounds` is only compared
    /// against it.
    pub fn apply_completion(
        &mut self,
        round_number: u32,
        rounds_exhausted: bool,
        remaining_rounds: Option<i64>,
    ) -> RoundReport {
        self.record_round_number(round_number);
        if rounds_exhausted {
            self.server_exhausted = true;
        }
        let disagreement = remaining_rounds
            .map(|remaining| (remaining <= 0) != rounds_exhausted)
            .unwrap_or(false);
        RoundReport {
            current: self.current,
            exhausted: self.is_exhausted(),
            disagreement,
        }
    }
}
