//! Trial (accusation) stream handling.

pub mod record;
pub mod registry;
pub mod session;
pub mod state;
