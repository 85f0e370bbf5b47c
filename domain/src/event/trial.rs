//! Events of the accusation/trial stream.

use crate::trial::record::{Ballot, TrialOutcome, VoteTally};
use serde::{Deserialize, Serialize};

/// One event on a trial stream, tagged by its `type` field.
///
/// Chunk events for testimonies and votes identify their target by name,
/// not by index; the session resolves names through its registries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrialEvent {
    Start {
        #[serde(default)]
        accused_name: Option<String>,
    },
    /// A new phase is announced (`defense`, `testimonies`, `voting`, `verdict`).
    Step { step: String, title: String },

    EvaluationChunk { content: String },
    EvaluationComplete {
        #[serde(default)]
        score: Option<f64>,
        #[serde(default)]
        feedback: Option<String>,
    },
    ReasoningChallenge { message: String },

    DefenseChunk { content: String },
    DefenseComplete { defense: String },

    WitnessStart {
        witness_name: String,
        #[serde(default)]
        index: Option<usize>,
    },
    /// A testimony fragment. Without a name it belongs to the most
    /// recently started witness.
    TestimonyChunk {
        #[serde(default)]
        witness_name: Option<String>,
        content: String,
    },
    WitnessComplete {
        witness_name: String,
        testimony: String,
    },

    VoteStart {
        voter_name: String,
        #[serde(default)]
        index: Option<usize>,
    },
    VoteChunk {
        #[serde(default)]
        voter_name: Option<String>,
        content: String,
    },
    VoteComplete {
        voter_name: String,
        vote: Ballot,
        #[serde(default)]
        reason: String,
    },
    VoteSummary { vote_summary: VoteTally },

    Verdict { final_verdict: bool },
    Correctness { is_correct: bool },

    SolutionChunk { content: String },
    SolutionComplete {
        #[serde(default)]
        solution: Option<String>,
    },

    /// Terminal success with the full trial record.
    Complete(TrialOutcome),
    /// Terminal failure reported by the server.
    Error {
        #[serde(default)]
        message: String,
    },
    #[serde(other)]
    Unknown,
}

impl TrialEvent {
    /// Wire name of the event type.
    pub fn kind(&self) -> &'static str {
        match self {
            TrialEvent::Start { .. } => "start",
            TrialEvent::Step { .. } => "step",
            TrialEvent::EvaluationChunk { .. } => "evaluation_chunk",
            TrialEvent::EvaluationComplete { .. } => "evaluation_complete",
            TrialEvent::ReasoningChallenge { .. } => "reasoning_challenge",
            TrialEvent::DefenseChunk { .. } => "defense_chunk",
            TrialEvent::DefenseComplete { .. } => "defense_complete",
            TrialEvent::WitnessStart { .. } => "witness_start",
            TrialEvent::TestimonyChunk { .. } => "testimony_chunk",
            TrialEvent::WitnessComplete { .. } => "witness_complete",
            TrialEvent::VoteStart { .. } => "vote_start",
            TrialEvent::VoteChunk { .. } => "vote_chunk",
            TrialEvent::VoteComplete { .. } => "vote_complete",
            TrialEvent::VoteSummary { .. } => "vote_summary",
            TrialEvent::Verdict { .. } => "verdict",
            TrialEvent::Correctness { .. } => "correctness",
            TrialEvent::SolutionChunk { .. } => "solution_chunk",
            TrialEvent::SolutionComplete { .. } => "solution_complete",
            TrialEvent::Complete(_) => "complete",
            TrialEvent::Error { .. } => "error",
            TrialEvent::Unknown => "unknown",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TrialEvent::Complete(_) | TrialEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> TrialEvent {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_witness_events() {
        assert_eq!(
            parse(r#"{"type":"witness_start","witness_name":"王医生","index":0}"#),
            TrialEvent::WitnessStart {
                witness_name: "王医生".into(),
                index: Some(0)
            }
        );
        assert_eq!(
            parse(r#"{"type":"testimony_chunk","witness_name":"王医生","content":"他"}"#),
            TrialEvent::TestimonyChunk {
                witness_name: Some("王医生".into()),
                content: "他".into()
            }
        );
        assert_eq!(
            parse(r#"{"type":"testimony_chunk","content":"他"}"#),
            TrialEvent::TestimonyChunk {
                witness_name: None,
                content: "他".into()
            }
        );
    }

    #[test]
    fn test_vote_events() {
        assert_eq!(
            parse(r#"{"type":"vote_complete","voter_name":"李管家","vote":"反对","reason":"证据不足"}"#),
            TrialEvent::VoteComplete {
                voter_name: "李管家".into(),
                vote: Ballot::Oppose,
                reason: "证据不足".into()
            }
        );
        assert_eq!(
            parse(r#"{"type":"vote_summary","vote_summary":{"support":3,"oppose":2,"total":5}}"#),
            TrialEvent::VoteSummary {
                vote_summary: VoteTally::new(3, 2, 5)
            }
        );
    }

    #[test]
    fn test_bare_complete_is_terminal() {
        let event = parse(r#"{"type":"complete"}"#);
        assert_eq!(event, TrialEvent::Complete(TrialOutcome::default()));
        assert!(event.is_terminal());
    }

    #[test]
    fn test_complete_with_record() {
        let event = parse(r#"{"type":"complete","accused_name":"张三","is_correct":false}"#);
        match event {
            TrialEvent::Complete(outcome) => {
                assert_eq!(outcome.accused_name.as_deref(), Some("张三"));
                assert_eq!(outcome.is_correct, Some(false));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_evaluation_complete_accepts_integer_score() {
        assert_eq!(
            parse(r#"{"type":"evaluation_complete","score":7,"feedback":"合理"}"#),
            TrialEvent::EvaluationComplete {
                score: Some(7.0),
                feedback: Some("合理".into())
            }
        );
    }

    #[test]
    fn test_unknown_trial_event() {
        assert_eq!(parse(r#"{"type":"spectator_joined"}"#), TrialEvent::Unknown);
        assert_eq!(TrialEvent::Unknown.kind(), "unknown");
    }
}
