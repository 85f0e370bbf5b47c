//! Evidence domain.
//!
//! - [`item::EvidenceItem`]: one discovered piece of evidence
//! - [`ledger::EvidenceLedger`]: name-keyed, append-only collection

pub mod item;
pub mod ledger;
