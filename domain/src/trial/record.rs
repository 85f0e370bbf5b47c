//! Value types carried by trial events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire value of a supporting vote.
pub const BALLOT_SUPPORT: &str = "支持";
/// Wire value of an opposing vote.
pub const BALLOT_OPPOSE: &str = "反对";

/// A juror's vote on the accusation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Ballot {
    Support,
    Oppose,
    /// A value outside the two known ones, kept verbatim.
    Other(String),
}

impl Ballot {
    pub fn as_str(&self) -> &str {
        match self {
            Ballot::Support => BALLOT_SUPPORT,
            Ballot::Oppose => BALLOT_OPPOSE,
            Ballot::Other(s) => s,
        }
    }

    pub fn is_support(&self) -> bool {
        matches!(self, Ballot::Support)
    }
}

impl From<String> for Ballot {
    fn from(value: String) -> Self {
        match value.trim() {
            BALLOT_SUPPORT => Ballot::Support,
            BALLOT_OPPOSE => Ballot::Oppose,
            _ => Ballot::Other(value),
        }
    }
}

impl From<Ballot> for String {
    fn from(value: Ballot) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vote rollup as computed by the server.
///
/// Always displayed as received; never recomputed from individual votes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub support: u32,
    pub oppose: u32,
    pub total: u32,
}

impl VoteTally {
    pub fn new(support: u32, oppose: u32, total: u32) -> Self {
        Self {
            support,
            oppose,
            total,
        }
    }

    /// Supporting votes required for a conviction (strict majority).
    pub fn majority_needed(&self) -> u32 {
        self.total / 2 + 1
    }
}

/// One testimony as recorded in the final trial record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestimonyRecord {
    pub witness_name: String,
    #[serde(default)]
    pub testimony: String,
}

/// One vote as recorded in the final trial record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub voter_name: String,
    pub vote: Ballot,
    #[serde(default)]
    pub reason: String,
}

/// Full trial record sent with the terminal `complete` event.
///
/// Every field is optional so that a bare `{"type":"complete"}` still
/// decodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialOutcome {
    pub accused_name: Option<String>,
    pub accuser_reasoning: Option<String>,
    pub accused_defense: Option<String>,
    pub witness_testimonies: Vec<TestimonyRecord>,
    pub votes: Vec<VoteRecord>,
    pub vote_summary: Option<VoteTally>,
    pub final_verdict: Option<bool>,
    pub is_correct: Option<bool>,
    pub case_solution: Option<String>,
}
