//! Core building blocks shared by every stream session.

pub mod error;
pub mod text_slot;
