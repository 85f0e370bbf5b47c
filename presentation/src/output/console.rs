//! Console output formatter for dialogue and trial results

use casefile_application::AskQuestionOutput;
use casefile_domain::{
    EvidenceItem, GameStateSummary, Hint, QuestionRoundTracker, RoundReport, StartedGame,
    TextSlot, TrialSnapshot, TrialStatus,
};
use colored::Colorize;
use serde::Serialize;

/// Formats game results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a completed exchange, answer included
    pub fn format_dialogue(output: &AskQuestionOutput, rounds: &QuestionRoundTracker) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{} {}\n",
            "Q:".cyan().bold(),
            output.dialogue.question
        ));
        out.push_str(&format!(
            "{}\n{}\n",
            format!("── {} ──", output.dialogue.character_name)
                .yellow()
                .bold(),
            output.dialogue.answer.render()
        ));
        out.push_str(&Self::format_exchange_summary(output, rounds));
        out
    }

    /// Format what an exchange changed: new evidence and the round counter
    pub fn format_exchange_summary(
        output: &AskQuestionOutput,
        rounds: &QuestionRoundTracker,
    ) -> String {
        let mut out = String::new();
        for item in &output.revealed {
            out.push_str(&Self::format_evidence(item));
            out.push('\n');
        }
        out.push_str(&Self::format_rounds(&output.round, rounds));
        out.push('\n');
        out
    }

    /// One line announcing a piece of evidence
    pub fn format_evidence(item: &EvidenceItem) -> String {
        let mut line = format!(
            "{} {} ({})",
            "[新证据]".green().bold(),
            item.name.bold(),
            item.evidence_type
        );
        if !item.description.is_empty() {
            line.push_str(&format!(": {}", item.description));
        }
        if !item.significance.is_empty() {
            line.push_str(&format!("\n  {}", item.significance.dimmed()));
        }
        line
    }

    /// Round counter after a completed exchange
    pub fn format_rounds(report: &RoundReport, rounds: &QuestionRoundTracker) -> String {
        let mut line = format!(
            "{} {}/{}",
            "回合:".cyan(),
            report.current,
            rounds.max()
        );
        if report.exhausted {
            line.push_str(&format!("  {}", "提问次数已用完".red().bold()));
        }
        if report.disagreement {
            line.push_str(&format!("  {}", "(服务器回合状态与本地计数不一致)".yellow()));
        }
        line
    }

    /// Format the full trial record
    pub fn format_trial(snapshot: &TrialSnapshot) -> String {
        let state = &snapshot.state;
        let mut out = String::new();

        let accused = state.accused.as_deref().unwrap_or("?");
        out.push_str(&Self::header(&format!("审判: {}", accused)));
        out.push('\n');

        if let Some(evaluation) = &state.evaluation {
            out.push_str(&Self::section_header("推理评估"));
            if !evaluation.text.text().is_empty() {
                out.push_str(&Self::slot(&evaluation.text));
            }
            if let Some(score) = evaluation.score {
                out.push_str(&format!("{} {}\n", "评分:".cyan(), score));
            }
            if let Some(feedback) = &evaluation.feedback {
                out.push_str(&format!("{} {}\n", "反馈:".cyan(), feedback));
            }
        }

        if let Some(challenge) = &state.challenge {
            out.push_str(&format!("\n{} {}\n", "质疑:".yellow().bold(), challenge));
        }

        if let Some(defense) = &state.defense {
            out.push_str(&Self::section_header("被告辩护"));
            out.push_str(&Self::slot(defense));
        }

        if !state.testimonies.is_empty() {
            out.push_str(&Self::section_header("证人证词"));
            for testimony in &state.testimonies {
                out.push_str(&format!(
                    "\n{}\n",
                    format!("── {} ──", testimony.witness_name).yellow().bold()
                ));
                out.push_str(&Self::slot(&testimony.text));
            }
        }

        if !state.votes.is_empty() || state.vote_summary.is_some() {
            out.push_str(&Self::section_header("陪审投票"));
            for vote in &state.votes {
                let ballot = match &vote.ballot {
                    Some(b) if b.is_support() => b.as_str().green().bold().to_string(),
                    Some(b) => b.as_str().red().bold().to_string(),
                    None => "…".dimmed().to_string(),
                };
                let reason = vote
                    .reason
                    .clone()
                    .unwrap_or_else(|| vote.text.render());
                out.push_str(&format!("  {} {}: {}\n", vote.voter_name.bold(), ballot, reason));
            }
            if let Some(tally) = state.vote_summary {
                out.push_str(&format!(
                    "\n{} 支持 {} / 反对 {} / 共 {} (定罪需 {} 票)\n",
                    "计票:".cyan().bold(),
                    tally.support,
                    tally.oppose,
                    tally.total,
                    tally.majority_needed()
                ));
            }
        }

        if let Some(verdict) = state.verdict {
            let label = if verdict.upheld() {
                verdict.label().red().bold()
            } else {
                verdict.label().green().bold()
            };
            out.push_str(&format!("\n{} {}\n", "判决:".cyan().bold(), label));
        }

        if let Some(correctness) = state.correctness {
            let message = if correctness.is_correct() {
                correctness.message().green().bold()
            } else {
                correctness.message().yellow().bold()
            };
            out.push_str(&format!("{}\n", message));
        }

        if let Some(solution) = &state.solution {
            out.push_str(&Self::section_header("案件真相"));
            out.push_str(&Self::slot(solution));
        }

        if let TrialStatus::Failed { message } = &snapshot.status {
            out.push_str(&format!("\n{} {}\n", "审判中断:".red().bold(), message));
        }

        out.push_str(&Self::footer());
        out
    }

    /// Format the server's game state
    pub fn format_state(summary: &GameStateSummary) -> String {
        let mut out = String::new();
        if let Some(title) = &summary.case_title {
            out.push_str(&format!("{}\n", title.bold()));
        }
        out.push_str(&format!("{} {}\n", "Session:".cyan(), summary.session_id));
        out.push_str(&format!(
            "{} {}/{}\n",
            "回合:".cyan(),
            summary.current_round,
            summary.max_rounds
        ));
        if let (Some(used), Some(max)) = (summary.hints_used, summary.max_hints) {
            out.push_str(&format!("{} {}/{}\n", "提示:".cyan(), used, max));
        }
        for (character, exchanges) in &summary.conversation_history {
            if exchanges.is_empty() {
                continue;
            }
            out.push_str(&format!(
                "\n{}\n",
                format!("── {} ──", character).yellow().bold()
            ));
            for exchange in exchanges {
                out.push_str(&format!("{} {}\n", "Q:".cyan(), exchange.question));
                out.push_str(&format!("{} {}\n", "A:".cyan(), exchange.response));
            }
        }
        out
    }

    /// Format the briefing of a newly started game
    pub fn format_started(started: &StartedGame) -> String {
        let case = &started.case;
        let mut out = String::new();
        out.push_str(&Self::header(&case.title));
        out.push('\n');
        out.push_str(&format!("{} {}\n", "Session:".cyan(), started.session_id));
        if !case.description.is_empty() {
            out.push_str(&format!("\n{}\n", case.description));
        }

        out.push_str(&Self::section_header("案件信息"));
        for (label, value) in [
            ("受害者:", &case.victim_name),
            ("案发地点:", &case.crime_scene),
            ("案发时间:", &case.time_of_crime),
        ] {
            if !value.is_empty() {
                out.push_str(&format!("{} {}\n", label.cyan(), value));
            }
        }

        if !case.characters.is_empty() {
            out.push_str(&Self::section_header("相关人物"));
            for character in &case.characters {
                let mut line = format!("  {}", character.name.bold());
                if let Some(age) = character.age {
                    line.push_str(&format!(" ({}岁)", age));
                }
                if !character.occupation.is_empty() {
                    line.push_str(&format!(" {}", character.occupation));
                }
                out.push_str(&line);
                out.push('\n');
            }
        }

        let counters = &started.game_state;
        out.push_str(&format!(
            "\n{} {}/{}  {} {}/{}\n",
            "回合:".cyan(),
            counters.current_round,
            counters.max_rounds,
            "提示:".cyan(),
            counters.hints_used,
            counters.max_hints
        ));
        out.push_str(&Self::footer());
        out
    }

    /// Format a hint and the remaining allowance
    pub fn format_hint(hint: &Hint) -> String {
        let mut out = format!("{} {}\n", "[提示]".green().bold(), hint.hint);
        out.push_str(&format!(
            "{} 已用 {} / 剩余 {}\n",
            "提示:".cyan(),
            hint.hints_used,
            hint.hints_remaining
        ));
        out
    }

    /// Format suggested questions as a numbered list
    pub fn format_suggestions(character_name: &str, questions: &[String]) -> String {
        let mut out = format!(
            "{}\n",
            format!("── {} 的建议问题 ──", character_name).yellow().bold()
        );
        if questions.is_empty() {
            out.push_str(&format!("{}\n", "(暂无建议)".dimmed()));
        }
        for (i, question) in questions.iter().enumerate() {
            out.push_str(&format!("  {}. {}\n", i + 1, question));
        }
        out
    }

    /// Format as JSON
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn slot(text: &TextSlot) -> String {
        format!("{}\n", text.render())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}
