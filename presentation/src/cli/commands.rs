//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable console output
    Text,
    /// JSON output
    Json,
}

/// Which stream a recording contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReplayKind {
    /// A question/answer stream
    Dialogue,
    /// An accusation/trial stream
    Trial,
}

/// CLI arguments for casefile
#[derive(Parser, Debug)]
#[command(name = "casefile")]
#[command(author, version, about = "Terminal client for the murder-mystery game server")]
#[command(long_about = r#"
casefile questions suspects and stages trials against a running game server,
rendering the streamed answers as they arrive.

Configuration is loaded from (in priority order):
1. CASEFILE_* env vars      e.g. CASEFILE_SERVER__BASE_URL
2. --config <path>          Explicit config file
3. ./casefile.toml          Project-level config
4. ~/.config/casefile/config.toml   Global config

Example:
  casefile start --case 0
  casefile ask -s 3f2a 王医生 "案发当晚你在哪里？"
  casefile suggest -s 3f2a 王医生
  casefile accuse -s 3f2a 张三 "他有动机，也没有不在场证明"
  casefile replay trial recorded/trial.sse --fragment-size 7
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Do not echo streamed text while it arrives
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Game server base URL (overrides configuration)
    #[arg(long, value_name = "URL", global = true)]
    pub server: Option<String>,

    /// Append a JSONL transcript to this file (overrides configuration)
    #[arg(long, value_name = "PATH", global = true)]
    pub transcript: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a new game and show the case briefing
    Start {
        /// Index of the case to play
        #[arg(long = "case", default_value_t = 0)]
        case_index: u32,
        /// Client identifier reported to the server
        #[arg(long)]
        client_id: Option<String>,
    },
    /// Ask a character one question and stream the answer
    Ask {
        /// Game session id (defaults to game.session_id from config)
        #[arg(short, long)]
        session: Option<String>,
        /// Character to question
        character: String,
        /// The question
        question: String,
    },
    /// Accuse a suspect and stream the trial
    Accuse {
        /// Game session id (defaults to game.session_id from config)
        #[arg(short, long)]
        session: Option<String>,
        /// Suspect to accuse
        accused: String,
        /// Your reasoning
        reasoning: String,
    },
    /// Feed a recorded stream file through the client
    Replay {
        /// Kind of stream in the file
        #[arg(value_enum)]
        kind: ReplayKind,
        /// Recorded stream, one `data: {...}` line per event
        file: PathBuf,
        /// Bytes per fragment handed to the parser
        #[arg(long, default_value_t = 64)]
        fragment_size: usize,
        /// Character (dialogue) or accused (trial) name for the session
        #[arg(long, default_value = "replay")]
        name: String,
    },
    /// Ask the server for suggested questions for a character
    Suggest {
        /// Game session id (defaults to game.session_id from config)
        #[arg(short, long)]
        session: Option<String>,
        /// Character to get suggestions for
        character: String,
    },
    /// Spend one of the game's hints
    Hint {
        /// Game session id (defaults to game.session_id from config)
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Show the server's view of a game
    State {
        /// Game session id (defaults to game.session_id from config)
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Show configuration sources and the merged configuration
    ShowConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli =
            Cli::try_parse_from(["casefile", "ask", "-s", "g1", "王医生", "你在哪？"]).unwrap();
        match cli.command {
            Command::Ask {
                session,
                character,
                question,
            } => {
                assert_eq!(session.as_deref(), Some("g1"));
                assert_eq!(character, "王医生");
                assert_eq!(question, "你在哪？");
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.output, OutputFormat::Text);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "casefile",
            "state",
            "-s",
            "g1",
            "-vv",
            "--output",
            "json",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.no_color);
    }

    #[test]
    fn test_parse_replay_defaults() {
        let cli = Cli::try_parse_from(["casefile", "replay", "trial", "t.sse"]).unwrap();
        match cli.command {
            Command::Replay {
                kind,
                file,
                fragment_size,
                name,
            } => {
                assert_eq!(kind, ReplayKind::Trial);
                assert_eq!(file, PathBuf::from("t.sse"));
                assert_eq!(fragment_size, 64);
                assert_eq!(name, "replay");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_start_and_suggest() {
        let cli = Cli::try_parse_from(["casefile", "start", "--case", "2"]).unwrap();
        match cli.command {
            Command::Start {
                case_index,
                client_id,
            } => {
                assert_eq!(case_index, 2);
                assert_eq!(client_id, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["casefile", "suggest", "--session", "g1", "王医生"])
            .unwrap();
        match cli.command {
            Command::Suggest { session, character } => {
                assert_eq!(session.as_deref(), Some("g1"));
                assert_eq!(character, "王医生");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_accuse_requires_reasoning() {
        assert!(Cli::try_parse_from(["casefile", "accuse", "张三"]).is_err());
    }
}
