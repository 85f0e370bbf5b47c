//! State accumulated by a trial stream.

use crate::core::text_slot::TextSlot;
use crate::trial::record::{Ballot, TestimonyRecord, TrialOutcome, VoteRecord, VoteTally};
use serde::Serialize;
use std::fmt;

/// Phases of a trial in their canonical order.
///
/// Events may arrive out of this order; the phase only records how far the
/// trial has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialPhase {
    Opening,
    Evaluation,
    ReasoningChallenge,
    Defense,
    Testimonies,
    Voting,
    Verdict,
    Correctness,
    Solution,
    Completion,
}

impl TrialPhase {
    /// Position in the canonical order, starting at 0.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Phase announced by a `step` event, if the step name is known.
    pub fn from_step(step: &str) -> Option<Self> {
        match step {
            "evaluation" => Some(TrialPhase::Evaluation),
            "reasoning_challenge" => Some(TrialPhase::ReasoningChallenge),
            "defense" => Some(TrialPhase::Defense),
            "testimonies" => Some(TrialPhase::Testimonies),
            "voting" => Some(TrialPhase::Voting),
            "verdict" => Some(TrialPhase::Verdict),
            "solution" => Some(TrialPhase::Solution),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrialPhase::Opening => "opening",
            TrialPhase::Evaluation => "evaluation",
            TrialPhase::ReasoningChallenge => "reasoning_challenge",
            TrialPhase::Defense => "defense",
            TrialPhase::Testimonies => "testimonies",
            TrialPhase::Voting => "voting",
            TrialPhase::Verdict => "verdict",
            TrialPhase::Correctness => "correctness",
            TrialPhase::Solution => "solution",
            TrialPhase::Completion => "completion",
        }
    }
}

impl fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A step announced by the server, kept in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialStep {
    pub step: String,
    pub title: String,
}

/// Evaluation of the player's reasoning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub text: TextSlot,
    pub score: Option<f64>,
    pub feedback: Option<String>,
}

/// One witness and the testimony streamed for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Testimony {
    pub witness_name: String,
    pub text: TextSlot,
}

impl Testimony {
    pub fn new(witness_name: &str) -> Self {
        Self {
            witness_name: witness_name.to_string(),
            text: TextSlot::streaming(),
        }
    }

    pub fn record(&self) -> TestimonyRecord {
        TestimonyRecord {
            witness_name: self.witness_name.clone(),
            testimony: self.text.text().to_string(),
        }
    }
}

/// One juror's vote, streamed then settled by `vote_complete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoteEntry {
    pub voter_name: String,
    pub text: TextSlot,
    pub ballot: Option<Ballot>,
    pub reason: Option<String>,
}

impl VoteEntry {
    pub fn new(voter_name: &str) -> Self {
        Self {
            voter_name: voter_name.to_string(),
            text: TextSlot::streaming(),
            ballot: None,
            reason: None,
        }
    }

    /// The settled vote, once `vote_complete` has arrived.
    pub fn record(&self) -> Option<VoteRecord> {
        self.ballot.as_ref().map(|vote| VoteRecord {
            voter_name: self.voter_name.clone(),
            vote: vote.clone(),
            reason: self.reason.clone().unwrap_or_default(),
        })
    }
}

/// Whether the jury upheld the accusation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict(pub bool);

impl Verdict {
    pub fn upheld(self) -> bool {
        self.0
    }

    pub fn label(self) -> &'static str {
        if self.0 { "指控成立" } else { "指控不成立" }
    }
}

/// Whether the player accused the real culprit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Correctness(pub bool);

impl Correctness {
    pub fn is_correct(self) -> bool {
        self.0
    }

    pub fn message(self) -> &'static str {
        if self.0 {
            "恭喜！你找到了真凶！"
        } else {
            "很遗憾，你指控了错误的人。"
        }
    }
}

/// Everything a trial stream has produced so far.
///
/// `testimonies` and `votes` are indexed by the session's witness and voter
/// registries: entry `i` belongs to the name registered with index `i`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialState {
    pub accused: Option<String>,
    pub phase: TrialPhase,
    pub steps: Vec<TrialStep>,
    pub evaluation: Option<Evaluation>,
    pub challenge: Option<String>,
    pub defense: Option<TextSlot>,
    pub testimonies: Vec<Testimony>,
    pub votes: Vec<VoteEntry>,
    pub vote_summary: Option<VoteTally>,
    pub verdict: Option<Verdict>,
    pub correctness: Option<Correctness>,
    pub solution: Option<TextSlot>,
    pub outcome: Option<TrialOutcome>,
}

impl Default for TrialState {
    fn default() -> Self {
        Self {
            accused: None,
            phase: TrialPhase::Opening,
            steps: Vec::new(),
            evaluation: None,
            challenge: None,
            defense: None,
            testimonies: Vec::new(),
            votes: Vec::new(),
            vote_summary: None,
            verdict: None,
            correctness: None,
            solution: None,
            outcome: None,
        }
    }
}

impl TrialState {
    /// Move the phase forward. Earlier phases arriving late leave it as is.
    pub fn advance(&mut self, phase: TrialPhase) {
        if phase > self.phase {
            self.phase = phase;
        }
    }

    /// Close every slot still streaming, keeping its text.
    pub fn finalize_open_slots(&mut self) {
        if let Some(evaluation) = self.evaluation.as_mut() {
            evaluation.text.finalize();
        }
        if let Some(defense) = self.defense.as_mut() {
            defense.finalize();
        }
        for testimony in &mut self.testimonies {
            testimony.text.finalize();
        }
        for vote in &mut self.votes {
            vote.text.finalize();
        }
        if let Some(solution) = self.solution.as_mut() {
            solution.finalize();
        }
    }

    /// Supporting votes needed for a conviction, for display.
    pub fn majority_needed(&self) -> Option<u32> {
        self.vote_summary.map(|tally| tally.majority_needed())
    }
}
