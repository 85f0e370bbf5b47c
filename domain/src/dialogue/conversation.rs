//! Per-character history of completed exchanges.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One completed question and its final answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub question: String,
    pub answer: String,
    pub round_number: u32,
}

/// Completed exchanges, grouped by character.
///
/// Only answers that reached `complete` are recorded; an errored stream
/// leaves the log untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLog {
    by_character: BTreeMap<String, Vec<ConversationEntry>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, character_name: &str, entry: ConversationEntry) {
        self.by_character
            .entry(character_name.to_string())
            .or_default()
            .push(entry);
    }

    /// Exchanges with one character, oldest first.
    pub fn history(&self, character_name: &str) -> &[ConversationEntry] {
        self.by_character
            .get(character_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn characters(&self) -> impl Iterator<Item = &str> {
        self.by_character.keys().map(String::as_str)
    }

    /// Total number of recorded exchanges.
    pub fn len(&self) -> usize {
        self.by_character.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
