//! Server-side game summary.

use crate::dialogue::conversation::{ConversationEntry, ConversationLog};
use crate::round::tracker::QuestionRoundTracker;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary returned by the game state endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateSummary {
    pub session_id: String,
    pub current_round: u32,
    pub max_rounds: u32,
    #[serde(default)]
    pub hints_used: Option<u32>,
    #[serde(default)]
    pub max_hints: Option<u32>,
    /// Completed exchanges the server remembers, keyed by character.
    #[serde(default)]
    pub conversation_history: BTreeMap<String, Vec<RecordedExchange>>,
    #[serde(default)]
    pub case_title: Option<String>,
}

/// One exchange as the server records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedExchange {
    pub question: String,
    pub response: String,
    #[serde(default)]
    pub round: Option<u32>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl GameStateSummary {
    /// Summary of a game nobody has played yet.
    pub fn fresh(session_id: impl Into<String>, max_rounds: u32) -> Self {
        Self {
            session_id: session_id.into(),
            current_round: 0,
            max_rounds,
            hints_used: None,
            max_hints: None,
            conversation_history: BTreeMap::new(),
            case_title: None,
        }
    }

    /// Round tracker seeded with the server's counters.
    pub fn round_tracker(&self) -> QuestionRoundTracker {
        QuestionRoundTracker::resume(self.current_round, self.max_rounds)
    }

    /// Conversation log rebuilt from the server's history.
    ///
    /// Characters with no exchanges are skipped. A record without a round
    /// number gets round 0.
    pub fn conversation_log(&self) -> ConversationLog {
        let mut log = ConversationLog::new();
        for (character_name, exchanges) in &self.conversation_history {
            for exchange in exchanges {
                log.record(
                    character_name,
                    ConversationEntry {
                        question: exchange.question.clone(),
                        answer: exchange.response.clone(),
                        round_number: exchange.round.unwrap_or(0),
                    },
                );
            }
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ignores_extra_fields() {
        let summary: GameStateSummary = serde_json::from_str(
            r#"{
                "session_id": "abc",
                "current_round": 3,
                "max_rounds": 30,
                "hints_used": 1,
                "max_hints": 3,
                "conversation_history": {},
                "case_title": "庄园谜案",
                "characters": []
            }"#,
        )
        .unwrap();
        assert_eq!(summary.case_title.as_deref(), Some("庄园谜案"));
        let tracker = summary.round_tracker();
        assert_eq!(tracker.current(), 3);
        assert_eq!(tracker.remaining(), 27);
    }

    #[test]
    fn test_null_case_title() {
        let summary: GameStateSummary = serde_json::from_str(
            r#"{"session_id":"abc","current_round":0,"max_rounds":30,"case_title":null}"#,
        )
        .unwrap();
        assert_eq!(summary.case_title, None);
        assert!(summary.conversation_history.is_empty());
    }

    #[test]
    fn test_conversation_log_from_history() {
        let summary: GameStateSummary = serde_json::from_str(
            r#"{
                "session_id": "abc",
                "current_round": 2,
                "max_rounds": 30,
                "conversation_history": {
                    "王医生": [
                        {"question": "你在哪？", "response": "书房", "timestamp": "2025-01-01T20:00:00", "round": 1},
                        {"question": "几点？", "response": "十点", "round": 2}
                    ],
                    "李管家": [],
                    "张三": [{"question": "认识死者吗？", "response": "认识"}]
                }
            }"#,
        )
        .unwrap();

        let log = summary.conversation_log();
        assert_eq!(log.len(), 3);
        assert_eq!(log.characters().collect::<Vec<_>>(), vec!["张三", "王医生"]);
        let history = log.history("王医生");
        assert_eq!(history[0].answer, "书房");
        assert_eq!(history[1].round_number, 2);
        assert_eq!(log.history("张三")[0].round_number, 0);
    }

    #[test]
    fn test_fresh_summary() {
        let summary = GameStateSummary::fresh("g1", 20);
        assert_eq!(summary.round_tracker().remaining(), 20);
        assert!(summary.conversation_log().is_empty());
    }
}
