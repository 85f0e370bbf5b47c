//! HTTP adapter for the game server.

mod transport;

pub use transport::{HttpGameTransport, error_detail};
