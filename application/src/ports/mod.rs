//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod game_transport;
pub mod stream_observer;
pub mod transcript_logger;
