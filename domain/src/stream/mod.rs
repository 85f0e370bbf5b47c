//! Wire-level stream handling: line framing and event-line parsing.

pub mod framer;
pub mod parser;
