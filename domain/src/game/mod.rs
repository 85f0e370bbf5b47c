//! Per-game state shared by successive dialogue streams.

pub mod case;
pub mod progress;
pub mod state;
