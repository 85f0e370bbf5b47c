//! Messages of the suggested-questions side channel.

use serde::{Deserialize, Serialize};

/// Client → server frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SuggestionRequest {
    GetSuggestedQuestions { character_name: String },
    Ping,
}

/// Server → client frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SuggestionMessage {
    SuggestedQuestions {
        #[serde(default)]
        character_name: Option<String>,
        #[serde(default)]
        questions: Vec<String>,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    Pong,
    #[serde(other)]
    Unknown,
}

impl SuggestionMessage {
    /// Whether this frame answers a `get_suggested_questions` request.
    pub fn is_reply(&self) -> bool {
        matches!(
            self,
            SuggestionMessage::SuggestedQuestions { .. } | SuggestionMessage::Error { .. }
        )
    }
}
