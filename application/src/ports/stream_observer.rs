//! Stream observation port
//!
//! Presentation surfaces subscribe to session state through this trait
//! instead of parsing streams themselves.

use casefile_domain::{
    DialogueStreamSession, DialogueUpdate, EvidenceItem, TrialSession, TrialUpdate,
};

/// Callback for state changes while a stream is consumed.
///
/// Every method receives a read-only view of the session after the event
/// was applied. All methods default to no-ops.
pub trait StreamObserver: Send + Sync {
    /// Called after each dialogue event.
    fn on_dialogue_update(&self, _session: &DialogueStreamSession, _update: &DialogueUpdate) {}

    /// Called once per newly revealed piece of evidence.
    fn on_evidence_revealed(&self, _item: &EvidenceItem) {}

    /// Called after each trial event.
    fn on_trial_update(&self, _session: &TrialSession, _update: &TrialUpdate) {}

    /// Called for an event line that could not be decoded.
    fn on_malformed_line(&self, _payload: &str, _reason: &str) {}
}

/// No-op observer for when nothing is displayed
pub struct NoObserver;

impl StreamObserver for NoObserver {}
