//! Infrastructure layer for casefile
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the HTTP game transport, a file replay
//! transport, the suggestion channel, configuration file loading, and
//! JSONL transcript logging.

pub mod config;
pub mod http;
pub mod logging;
pub mod replay;
pub mod suggestion;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigIssueCode, ConfigLoader, FileConfig, FileGameConfig, FileLoggingConfig,
    FileOutputConfig, FileServerConfig, Severity,
};
pub use http::{HttpGameTransport, error_detail};
pub use logging::JsonlTranscriptLogger;
pub use replay::{DEFAULT_FRAGMENT_SIZE, ReplayTransport};
pub use suggestion::{SuggestionChannel, SuggestionError, ws_url};
