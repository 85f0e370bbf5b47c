//! Evidence value types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a piece of evidence.
///
/// The server sends a lowercase string; values this client does not know
/// are kept as [`EvidenceType::Other`] instead of failing the event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EvidenceType {
    Physical,
    Testimony,
    Document,
    Behavioral,
    Other(String),
}

impl EvidenceType {
    pub fn as_str(&self) -> &str {
        match self {
            EvidenceType::Physical => "physical",
            EvidenceType::Testimony => "testimony",
            EvidenceType::Document => "document",
            EvidenceType::Behavioral => "behavioral",
            EvidenceType::Other(s) => s,
        }
    }
}

impl From<String> for EvidenceType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "physical" => EvidenceType::Physical,
            "testimony" => EvidenceType::Testimony,
            "document" => EvidenceType::Document,
            "behavioral" => EvidenceType::Behavioral,
            _ => EvidenceType::Other(value),
        }
    }
}

impl From<EvidenceType> for String {
    fn from(value: EvidenceType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discovered piece of evidence. `name` is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub significance: String,
    pub evidence_type: EvidenceType,
}

impl EvidenceItem {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        significance: impl Into<String>,
        evidence_type: EvidenceType,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            significance: significance.into(),
            evidence_type,
        }
    }
}
