//! Case briefing and hint replies.

use crate::game::state::GameStateSummary;
use serde::{Deserialize, Serialize};

/// A character as introduced in the case briefing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterBrief {
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub character_type: String,
}

/// What the player is told when a game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseBrief {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub victim_name: String,
    #[serde(default)]
    pub crime_scene: String,
    #[serde(default)]
    pub time_of_crime: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub characters: Vec<CharacterBrief>,
}

/// Counters reported alongside a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCounters {
    pub current_round: u32,
    pub max_rounds: u32,
    #[serde(default)]
    pub hints_used: u32,
    #[serde(default)]
    pub max_hints: u32,
}

/// Reply to a start-game request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartedGame {
    pub session_id: String,
    pub case: CaseBrief,
    pub game_state: GameCounters,
}

impl StartedGame {
    /// The new game as a state summary, with an empty history.
    pub fn summary(&self) -> GameStateSummary {
        GameStateSummary {
            current_round: self.game_state.current_round,
            hints_used: Some(self.game_state.hints_used),
            max_hints: Some(self.game_state.max_hints),
            case_title: Some(self.case.title.clone()),
            ..GameStateSummary::fresh(&self.session_id, self.game_state.max_rounds)
        }
    }
}

/// Reply to a hint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub hint: String,
    pub hints_used: u32,
    pub hints_remaining: u32,
}

impl Hint {
    pub fn is_last(&self) -> bool {
        self.hints_remaining == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_started_game_decoding() {
        let started: StartedGame = serde_json::from_str(
            r#"{
                "session_id": "9b1c",
                "case": {
                    "title": "庄园谜案",
                    "description": "富商死在书房",
                    "victim_name": "陈老爷",
                    "crime_scene": "书房",
                    "time_of_crime": "晚上十点",
                    "category": "classic",
                    "difficulty": "medium",
                    "characters": [
                        {"name": "王医生", "age": 45, "occupation": "医生", "personality": "冷静",
                         "background": "家庭医生", "character_type": "suspect"},
                        {"name": "李管家", "age": null, "occupation": "管家"}
                    ]
                },
                "game_state": {"current_round": 0, "max_rounds": 30, "hints_used": 0, "max_hints": 3}
            }"#,
        )
        .unwrap();

        assert_eq!(started.case.characters.len(), 2);
        assert_eq!(started.case.characters[0].age, Some(45));
        assert_eq!(started.case.characters[1].character_type, "");

        let summary = started.summary();
        assert_eq!(summary.session_id, "9b1c");
        assert_eq!(summary.max_rounds, 30);
        assert_eq!(summary.max_hints, Some(3));
        assert_eq!(summary.case_title.as_deref(), Some("庄园谜案"));
        assert!(summary.conversation_history.is_empty());
    }

    #[test]
    fn test_hint_decoding() {
        let hint: Hint =
            serde_json::from_str(r#"{"hint":"注意书房的窗户","hints_used":3,"hints_remaining":0}"#)
                .unwrap();
        assert!(hint.is_last());
    }
}
