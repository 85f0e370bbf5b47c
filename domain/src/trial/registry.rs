//! Name → index registry for dynamically discovered trial participants.

use serde::Serialize;
use std::collections::HashMap;

/// Result of [`ParticipantRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First sighting; the name received this index.
    New(usize),
    /// The name was already known under this index.
    Existing(usize),
}

impl Registration {
    pub fn index(self) -> usize {
        match self {
            Registration::New(i) | Registration::Existing(i) => i,
        }
    }

    pub fn is_new(self) -> bool {
        matches!(self, Registration::New(_))
    }
}

/// Append-only mapping of display names to sequential 0-based indices.
///
/// Indices follow first-seen order and are never reassigned, so chunk
/// events can be routed by name regardless of how they interleave.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParticipantRegistry {
    names: Vec<String>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `name`, assigning the next index on first sight.
    pub fn register(&mut self, name: &str) -> Registration {
        if let Some(&index) = self.by_name.get(name) {
            return Registration::Existing(index);
        }
        let index = self.names.len();
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), index);
        Registration::New(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Index of the most recently registered name.
    pub fn last(&self) -> Option<usize> {
        self.names.len().checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
