//! Error types for the suggestion channel

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Result type alias for suggestion channel operations
pub type Result<T> = std::result::Result<T, SuggestionError>;

/// Errors that can occur on the suggestion channel
#[derive(Error, Debug)]
pub enum SuggestionError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    #[error("Channel closed")]
    Closed,
}
