//! Typed stream events.
//!
//! The two streams share one wire format but have different vocabularies,
//! so each gets its own closed enum. Both decode unknown tags to an
//! `Unknown` variant.

pub mod dialogue;
pub mod trial;
