//! Live echo of streams as they are consumed

use casefile_application::StreamObserver;
use casefile_domain::{
    DialogueStreamSession, DialogueUpdate, TrialPhase, TrialSession, TrialState, TrialUpdate,
};
use colored::Colorize;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Prints answer text and trial progress to stdout while streams run.
///
/// Only deltas are written, so the terminal shows the answer growing chunk
/// by chunk. The full record is printed afterwards by
/// [`ConsoleFormatter`](crate::ConsoleFormatter).
pub struct ConsoleStreamObserver {
    echo: Mutex<EchoState>,
}

#[derive(Default)]
struct EchoState {
    dialogue_started: bool,
    /// Rendered answer text already written.
    answer: String,
    answer_closed: bool,
    phase: Option<TrialPhase>,
    witnesses_seen: usize,
    testimonies_done: Vec<bool>,
    votes_done: Vec<bool>,
}

impl ConsoleStreamObserver {
    pub fn new() -> Self {
        Self {
            echo: Mutex::new(EchoState::default()),
        }
    }

    fn write(text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    /// Text to print after a dialogue update, if any.
    fn dialogue_echo(&self, session: &DialogueStreamSession, update: &DialogueUpdate) -> String {
        let mut echo = self.echo.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out = String::new();

        if !echo.dialogue_started {
            echo.dialogue_started = true;
            out.push_str(&format!(
                "{}\n",
                format!("── {} ──", session.character_name()).yellow().bold()
            ));
        }

        match update {
            DialogueUpdate::Appended
            | DialogueUpdate::AnswerComplete
            | DialogueUpdate::Completed(_) => {
                if !echo.answer_closed {
                    let answer = session.answer();
                    let rendered = live_render(answer.text(), answer.is_finalized());
                    match rendered.strip_prefix(echo.answer.as_str()) {
                        Some(delta) => out.push_str(delta),
                        None => {
                            out.push('\n');
                            out.push_str(&rendered);
                        }
                    }
                    echo.answer = rendered;
                    if answer.is_finalized() {
                        echo.answer_closed = true;
                        out.push('\n');
                    }
                }
            }
            DialogueUpdate::Failed(message) => {
                out.push_str(&format!("\n{} {}\n", "错误:".red().bold(), message));
            }
            DialogueUpdate::Started
            | DialogueUpdate::EvidenceRevealed(_)
            | DialogueUpdate::Ignored(_) => {}
        }
        out
    }

    /// Text to print after a trial update, if any.
    fn trial_echo(&self, session: &TrialSession, update: &TrialUpdate) -> String {
        let mut echo = self.echo.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out = String::new();

        if let TrialUpdate::Failed(message) = update {
            out.push_str(&format!("{} {}\n", "审判中断:".red().bold(), message));
            return out;
        }
        if matches!(update, TrialUpdate::Ignored(_)) {
            return out;
        }

        let state = session.state();
        if echo.phase != Some(state.phase) {
            echo.phase = Some(state.phase);
            out.push_str(&format!("{} {}\n", "▸".cyan(), phase_title(state).cyan().bold()));
        }

        for testimony in state.testimonies.iter().skip(echo.witnesses_seen) {
            out.push_str(&format!("  {} {}\n", testimony.witness_name.bold(), "作证中…".dimmed()));
        }
        echo.witnesses_seen = state.testimonies.len();

        echo.testimonies_done.resize(state.testimonies.len(), false);
        for (done, testimony) in echo.testimonies_done.iter_mut().zip(&state.testimonies) {
            if !*done && testimony.text.is_finalized() {
                *done = true;
                out.push_str(&format!(
                    "  {} {}\n",
                    format!("{}:", testimony.witness_name).yellow(),
                    testimony.text.render()
                ));
            }
        }

        echo.votes_done.resize(state.votes.len(), false);
        for (done, vote) in echo.votes_done.iter_mut().zip(&state.votes) {
            if let (false, Some(ballot)) = (*done, &vote.ballot) {
                *done = true;
                out.push_str(&format!("  {} 投票 {}\n", vote.voter_name.bold(), ballot));
            }
        }
        out
    }
}

impl Default for ConsoleStreamObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamObserver for ConsoleStreamObserver {
    fn on_dialogue_update(&self, session: &DialogueStreamSession, update: &DialogueUpdate) {
        let text = self.dialogue_echo(session, update);
        if !text.is_empty() {
            Self::write(&text);
        }
    }

    fn on_trial_update(&self, session: &TrialSession, update: &TrialUpdate) {
        let text = self.trial_echo(session, update);
        if !text.is_empty() {
            Self::write(&text);
        }
    }

    fn on_malformed_line(&self, _payload: &str, reason: &str) {
        eprintln!("{} {}", "skipped malformed event:".dimmed(), reason.dimmed());
    }
}

/// Render for incremental echo: no cursor, and a trailing backslash is held
/// back while streaming since it may start an escaped newline.
fn live_render(text: &str, finalized: bool) -> String {
    let stable = if finalized {
        text
    } else {
        text.strip_suffix('\\').unwrap_or(text)
    };
    stable.replace("\\n", "\n")
}

/// Heading for the current phase, preferring the server's step title.
fn phase_title(state: &TrialState) -> String {
    state
        .steps
        .iter()
        .rev()
        .find(|step| TrialPhase::from_step(&step.step) == Some(state.phase))
        .map(|step| step.title.clone())
        .unwrap_or_else(|| state.phase.as_str().to_string())
}
