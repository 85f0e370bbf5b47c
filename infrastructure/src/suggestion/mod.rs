//! Suggested-questions side channel.

mod channel;
mod error;

pub use channel::{SuggestionChannel, ws_url};
pub use error::{Result, SuggestionError};
