//! Shared types for stream-consuming use cases.

use crate::ports::game_transport::TransportError;
use casefile_domain::DomainError;
use thiserror::Error;

/// Message recorded when a body ends without a terminal event.
pub const STREAM_SEVERED: &str = "stream ended before a terminal event";

/// Errors that end a dialogue or trial stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Stream ended before a terminal event")]
    Severed,

    #[error("Operation cancelled")]
    Cancelled,
}

impl StreamError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamError::Cancelled)
            || matches!(self, StreamError::Domain(e) if e.is_cancelled())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_cancelled() {
        assert!(StreamError::Cancelled.is_cancelled());
        assert!(StreamError::Domain(DomainError::Cancelled).is_cancelled());
        assert!(!StreamError::Severed.is_cancelled());
    }

    #[test]
    fn test_transport_error_converts() {
        let error: StreamError = TransportError::ConnectionError("refused".into()).into();
        assert_eq!(error.to_string(), "Transport error: Connection error: refused");
    }
}
