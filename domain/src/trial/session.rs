//! The trial stream state machine.

use crate::core::text_slot::TextSlot;
use crate::event::trial::TrialEvent;
use crate::trial::record::VoteTally;
use crate::trial::registry::{ParticipantRegistry, Registration};
use crate::trial::state::{
    Correctness, Evaluation, Testimony, TrialPhase, TrialState, TrialStep, Verdict, VoteEntry,
};
use serde::Serialize;

/// Lifecycle of a [`TrialSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrialStatus {
    Streaming,
    Completed,
    Failed { message: String },
}

impl TrialStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TrialStatus::Streaming)
    }
}

/// Why an event left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The session already completed or failed.
    Terminal,
    /// The target slot was already finalized.
    SlotFinalized,
    /// An unnamed chunk arrived before any participant was announced.
    NoParticipant,
    /// The event type is not handled by this client.
    UnknownEvent,
}

/// Result of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrialUpdate {
    Applied(TrialPhase),
    /// Applied, but the wire index disagreed with the registry.
    Reindexed {
        name: String,
        wire_index: usize,
        local_index: usize,
    },
    Completed,
    Failed(String),
    Ignored(IgnoreReason),
}

/// Read-only copy of a trial for observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSnapshot {
    pub status: TrialStatus,
    pub state: TrialState,
}

/// Consumes the events of one accusation.
///
/// A session is created per submission and never reused. Events are applied
/// strictly in arrival order; witnesses and voters are resolved through
/// append-only registries so chunk routing never depends on arrival order.
#[derive(Debug, Clone)]
pub struct TrialSession {
    accused_name: String,
    status: TrialStatus,
    state: TrialState,
    witnesses: ParticipantRegistry,
    voters: ParticipantRegistry,
}

impl TrialSession {
    pub fn new(accused_name: impl Into<String>) -> Self {
        let accused_name = accused_name.into();
        let state = TrialState {
            accused: Some(accused_name.clone()),
            ..Default::default()
        };
        Self {
            accused_name,
            status: TrialStatus::Streaming,
            state,
            witnesses: ParticipantRegistry::new(),
            voters: ParticipantRegistry::new(),
        }
    }

    pub fn accused_name(&self) -> &str {
        &self.accused_name
    }

    pub fn status(&self) -> &TrialStatus {
        &self.status
    }

    pub fn state(&self) -> &TrialState {
        &self.state
    }

    pub fn witnesses(&self) -> &ParticipantRegistry {
        &self.witnesses
    }

    pub fn voters(&self) -> &ParticipantRegistry {
        &self.voters
    }

    pub fn testimony(&self, witness_name: &str) -> Option<&Testimony> {
        self.witnesses
            .index_of(witness_name)
            .and_then(|i| self.state.testimonies.get(i))
    }

    pub fn vote(&self, voter_name: &str) -> Option<&VoteEntry> {
        self.voters
            .index_of(voter_name)
            .and_then(|i| self.state.votes.get(i))
    }

    pub fn snapshot(&self) -> TrialSnapshot {
        TrialSnapshot {
            status: self.status.clone(),
            state: self.state.clone(),
        }
    }

    /// Mark the session failed for a reason outside the event stream, such
    /// as a severed transport. Has no effect once terminal.
    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = TrialStatus::Failed {
            message: message.into(),
        };
        true
    }

    /// Apply one event to the session state.
    pub fn apply(&mut self, event: TrialEvent) -> TrialUpdate {
        if self.status.is_terminal() {
            return TrialUpdate::Ignored(IgnoreReason::Terminal);
        }

        match event {
            TrialEvent::Start { accused_name } => {
                if let Some(name) = accused_name {
                    self.state.accused = Some(name);
                }
                self.applied(TrialPhase::Opening)
            }
            TrialEvent::Step { step, title } => {
                let phase = TrialPhase::from_step(&step);
                self.state.steps.push(TrialStep { step, title });
                match phase {
                    Some(phase) => self.applied(phase),
                    None => TrialUpdate::Applied(self.state.phase),
                }
            }
            TrialEvent::EvaluationChunk { content } => {
                let appended = match self.state.evaluation.as_mut() {
                    Some(evaluation) => evaluation.text.append(&content),
                    None => {
                        self.state.evaluation = Some(Evaluation {
                            text: TextSlot::from_chunk(&content),
                            score: None,
                            feedback: None,
                        });
                        true
                    }
                };
                self.appended(appended, TrialPhase::Evaluation)
            }
            TrialEvent::EvaluationComplete { score, feedback } => {
                let evaluation = self.state.evaluation.get_or_insert_with(|| Evaluation {
                    text: TextSlot::streaming(),
                    score: None,
                    feedback: None,
                });
                let finalized = evaluation.text.finalize();
                if finalized {
                    evaluation.score = score;
                    evaluation.feedback = feedback;
                }
                self.appended(finalized, TrialPhase::Evaluation)
            }
            TrialEvent::ReasoningChallenge { message } => {
                self.state.challenge = Some(message);
                self.applied(TrialPhase::ReasoningChallenge)
            }
            TrialEvent::DefenseChunk { content } => {
                let appended = append_or_create(&mut self.state.defense, &content);
                self.appended(appended, TrialPhase::Defense)
            }
            TrialEvent::DefenseComplete { defense } => {
                let finalized = finalize_or_create(&mut self.state.defense, Some(&defense));
                self.appended(finalized, TrialPhase::Defense)
            }
            TrialEvent::WitnessStart {
                witness_name,
                index,
            } => {
                let local_index = self.register_witness(&witness_name);
                self.advance(TrialPhase::Testimonies);
                reindexed_or_applied(witness_name, index, local_index, TrialPhase::Testimonies)
            }
            TrialEvent::TestimonyChunk {
                witness_name,
                content,
            } => {
                let index = match witness_name {
                    Some(name) => Some(self.register_witness(&name)),
                    None => self.witnesses.last(),
                };
                let Some(index) = index else {
                    return TrialUpdate::Ignored(IgnoreReason::NoParticipant);
                };
                let appended = self.state.testimonies[index].text.append(&content);
                self.appended(appended, TrialPhase::Testimonies)
            }
            TrialEvent::WitnessComplete {
                witness_name,
                testimony,
            } => {
                let index = self.register_witness(&witness_name);
                let finalized = self.state.testimonies[index].text.finalize_with(&testimony);
                self.appended(finalized, TrialPhase::Testimonies)
            }
            TrialEvent::VoteStart { voter_name, index } => {
                let local_index = self.register_voter(&voter_name);
                self.advance(TrialPhase::Voting);
                reindexed_or_applied(voter_name, index, local_index, TrialPhase::Voting)
            }
            TrialEvent::VoteChunk {
                voter_name,
                content,
            } => {
                let index = match voter_name {
                    Some(name) => Some(self.register_voter(&name)),
                    None => self.voters.last(),
                };
                let Some(index) = index else {
                    return TrialUpdate::Ignored(IgnoreReason::NoParticipant);
                };
                let appended = self.state.votes[index].text.append(&content);
                self.appended(appended, TrialPhase::Voting)
            }
            TrialEvent::VoteComplete {
                voter_name,
                vote,
                reason,
            } => {
                let index = self.register_voter(&voter_name);
                let entry = &mut self.state.votes[index];
                let finalized = entry.text.finalize_with(&reason);
                if finalized {
                    entry.ballot = Some(vote);
                    entry.reason = Some(reason);
                }
                self.appended(finalized, TrialPhase::Voting)
            }
            TrialEvent::VoteSummary { vote_summary } => {
                self.state.vote_summary = Some(vote_summary);
                self.applied(TrialPhase::Verdict)
            }
            TrialEvent::Verdict { final_verdict } => {
                self.state.verdict = Some(Verdict(final_verdict));
                self.applied(TrialPhase::Verdict)
            }
            TrialEvent::Correctness { is_correct } => {
                self.state.correctness = Some(Correctness(is_correct));
                self.applied(TrialPhase::Correctness)
            }
            TrialEvent::SolutionChunk { content } => {
                let appended = append_or_create(&mut self.state.solution, &content);
                self.appended(appended, TrialPhase::Solution)
            }
            TrialEvent::SolutionComplete { solution } => {
                let finalized = finalize_or_create(&mut self.state.solution, solution.as_deref());
                self.appended(finalized, TrialPhase::Solution)
            }
            TrialEvent::Complete(outcome) => {
                finalize_or_create(&mut self.state.solution, outcome.case_solution.as_deref());
                self.state.finalize_open_slots();
                if self.state.vote_summary.is_none() {
                    self.state.vote_summary = outcome.vote_summary;
                }
                if self.state.verdict.is_none() {
                    self.state.verdict = outcome.final_verdict.map(Verdict);
                }
                if self.state.correctness.is_none() {
                    self.state.correctness = outcome.is_correct.map(Correctness);
                }
                if let Some(name) = &outcome.accused_name {
                    self.state.accused = Some(name.clone());
                }
                self.state.outcome = Some(outcome);
                self.advance(TrialPhase::Completion);
                self.status = TrialStatus::Completed;
                TrialUpdate::Completed
            }
            TrialEvent::Error { message } => {
                self.status = TrialStatus::Failed {
                    message: message.clone(),
                };
                TrialUpdate::Failed(message)
            }
            TrialEvent::Unknown => TrialUpdate::Ignored(IgnoreReason::UnknownEvent),
        }
    }

    /// The tally exactly as the server sent it.
    pub fn vote_summary(&self) -> Option<VoteTally> {
        self.state.vote_summary
    }

    fn register_witness(&mut self, name: &str) -> usize {
        let registration = self.witnesses.register(name);
        if let Registration::New(_) = registration {
            self.state.testimonies.push(Testimony::new(name));
        }
        registration.index()
    }

    fn register_voter(&mut self, name: &str) -> usize {
        let registration = self.voters.register(name);
        if let Registration::New(_) = registration {
            self.state.votes.push(VoteEntry::new(name));
        }
        registration.index()
    }

    fn advance(&mut self, phase: TrialPhase) {
        self.state.advance(phase);
    }

    fn applied(&mut self, phase: TrialPhase) -> TrialUpdate {
        self.advance(phase);
        TrialUpdate::Applied(phase)
    }

    fn appended(&mut self, changed: bool, phase: TrialPhase) -> TrialUpdate {
        if changed {
            self.applied(phase)
        } else {
            TrialUpdate::Ignored(IgnoreReason::SlotFinalized)
        }
    }
}

fn append_or_create(slot: &mut Option<TextSlot>, chunk: &str) -> bool {
    match slot {
        Some(slot) => slot.append(chunk),
        None => {
            *slot = Some(TextSlot::from_chunk(chunk));
            true
        }
    }
}

fn finalize_or_create(slot: &mut Option<TextSlot>, authoritative: Option<&str>) -> bool {
    match (slot.as_mut(), authoritative) {
        (Some(existing), Some(text)) => existing.finalize_with(text),
        (Some(existing), None) => existing.finalize(),
        (None, Some(text)) => {
            *slot = Some(TextSlot::finalized(text));
            true
        }
        (None, None) => false,
    }
}

fn reindexed_or_applied(
    name: String,
    wire_index: Option<usize>,
    local_index: usize,
    phase: TrialPhase,
) -> TrialUpdate {
    match wire_index {
        Some(wire_index) if wire_index != local_index => TrialUpdate::Reindexed {
            name,
            wire_index,
            local_index,
        },
        _ => TrialUpdate::Applied(phase),
    }
}
