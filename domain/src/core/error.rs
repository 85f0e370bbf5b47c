//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Accusation must name a suspect")]
    EmptyAccusation,

    #[error("A question to {0} is already in flight")]
    QuestionInFlight(String),

    #[error("No question rounds remain ({current}/{max})")]
    RoundsExhausted { current: u32, max: u32 },

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
