//! Game transport port
//!
//! Defines how the application layer opens event streams against the game
//! server. Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use casefile_domain::{GameStateSummary, Hint, StartedGame};
use futures::Stream;
use serde::Serialize;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur while opening or reading a stream.
///
/// Every variant is transport-fatal: the stream it came from is over.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Server returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Stream read failed: {0}")]
    BodyError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Raw response body, delivered in fragments of arbitrary size.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, TransportError>> + Send>>;

/// Body of a question request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionRequest {
    pub session_id: String,
    pub character_name: String,
    pub question: String,
}

/// Body of an accusation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccusationRequest {
    pub session_id: String,
    pub accused_name: String,
    pub reasoning: String,
}

/// Body of a start-game request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StartGameRequest {
    pub case_index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

/// Body of a hint request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HintRequest {
    pub session_id: String,
}

/// Access to the game server's endpoints.
#[async_trait]
pub trait GameTransport: Send + Sync {
    /// Open the answer stream for one question.
    async fn open_dialogue_stream(
        &self,
        request: &QuestionRequest,
    ) -> Result<ByteStream, TransportError>;

    /// Open the trial stream for one accusation.
    async fn open_trial_stream(
        &self,
        request: &AccusationRequest,
    ) -> Result<ByteStream, TransportError>;

    /// Fetch the server's summary of a game.
    async fn fetch_game_state(&self, session_id: &str) -> Result<GameStateSummary, TransportError>;

    /// Start a new game on the server.
    async fn start_game(&self, request: &StartGameRequest) -> Result<StartedGame, TransportError>;

    /// Spend one hint. The server refuses once the allowance is used up.
    async fn request_hint(&self, request: &HintRequest) -> Result<Hint, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_bodies() {
        let request = QuestionRequest {
            session_id: "s1".into(),
            character_name: "王医生".into(),
            question: "你在哪？".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "session_id": "s1",
                "character_name": "王医生",
                "question": "你在哪？"
            })
        );
    }

    #[test]
    fn test_start_request_omits_missing_client_id() {
        let request = StartGameRequest {
            case_index: 2,
            client_id: None,
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"case_index":2}"#
        );
        let request = StartGameRequest {
            case_index: 0,
            client_id: Some("c-1".into()),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"case_index": 0, "client_id": "c-1"})
        );
    }

    #[test]
    fn test_status_error_display() {
        let error = TransportError::Status {
            status: 404,
            detail: "游戏会话不存在".into(),
        };
        assert_eq!(error.to_string(), "Server returned 404: 游戏会话不存在");
    }
}
