//! Presentation layer for casefile
//!
//! This crate contains CLI definitions, console formatters, and the live
//! stream observer that echoes answers and trial progress as they arrive.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command, OutputFormat, ReplayKind};
pub use output::console::ConsoleFormatter;
pub use progress::reporter::ConsoleStreamObserver;
