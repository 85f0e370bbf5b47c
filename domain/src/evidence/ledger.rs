//! Deduplicating evidence collection.

use super::item::EvidenceItem;
use serde::Serialize;
use std::collections::HashSet;

/// Evidence discovered during one game, in reveal order.
///
/// Membership is keyed by name: revealing an item whose name is already
/// present leaves the ledger untouched and reports `false`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EvidenceLedger {
    items: Vec<EvidenceItem>,
    #[serde(skip)]
    names: HashSet<String>,
}

impl EvidenceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item. Returns `true` only when the name was not seen before.
    pub fn reveal(&mut self, item: EvidenceItem) -> bool {
        if self.names.contains(&item.name) {
            return false;
        }
        self.names.insert(item.name.clone());
        self.items.push(item);
        true
    }

    /// All items in reveal order.
    pub fn list(&self) -> &[EvidenceItem] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn get(&self, name: &str) -> Option<&EvidenceItem> {
        self.items.iter().find(|item| item.name == name)
    }
}
