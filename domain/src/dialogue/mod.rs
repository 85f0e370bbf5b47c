//! Question/answer exchanges with case characters.

pub mod conversation;
pub mod session;
