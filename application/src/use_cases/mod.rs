//! Use cases (application services)

pub mod ask_question;
pub mod request_hint;
pub mod shared;
pub mod start_game;
pub mod submit_accusation;
