//! CLI entrypoint for casefile
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use casefile_application::{
    AskQuestionInput, AskQuestionOutput, AskQuestionUseCase, GameSession, GameTransport,
    NoObserver, NoTranscriptLogger, RequestHintUseCase, StartGameRequest, StartGameUseCase,
    StreamError, StreamObserver, SubmitAccusationInput, SubmitAccusationUseCase, TranscriptLogger,
    TrialFailure,
};
use casefile_domain::TrialSnapshot;
use casefile_infrastructure::{
    ConfigLoader, FileConfig, HttpGameTransport, JsonlTranscriptLogger, ReplayTransport, Severity,
    SuggestionChannel,
};
use casefile_presentation::{
    Cli, Command, ConsoleFormatter, ConsoleStreamObserver, OutputFormat, ReplayKind,
};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Question and reasoning sent for recorded streams; never transmitted.
const REPLAY_PROMPT: &str = "(replay)";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("Failed to load configuration")?
    };
    check_config(&config)?;

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let transcript: Arc<dyn TranscriptLogger> = match cli
        .transcript
        .clone()
        .or_else(|| config.logging.transcript.clone())
        .and_then(JsonlTranscriptLogger::new)
    {
        Some(logger) => {
            info!("Writing transcript to {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoTranscriptLogger),
    };

    let observer: Box<dyn StreamObserver> = if cli.quiet || cli.output == OutputFormat::Json {
        Box::new(NoObserver)
    } else {
        Box::new(ConsoleStreamObserver::new())
    };
    let live = !cli.quiet && cli.output == OutputFormat::Text;

    match cli.command {
        Command::ShowConfig => {
            ConfigLoader::print_config_sources(cli.config.as_ref());
            println!();
            println!("{}", ConsoleFormatter::format_json(&config));
        }

        Command::Start {
            case_index,
            client_id,
        } => {
            let transport: Arc<dyn GameTransport> = Arc::new(http_transport(&cli.server, &config)?);
            let use_case = StartGameUseCase::new(transport).with_transcript_logger(transcript);
            let output = use_case
                .execute(StartGameRequest {
                    case_index,
                    client_id,
                })
                .await?;
            match cli.output {
                OutputFormat::Text => print!("{}", ConsoleFormatter::format_started(&output.started)),
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&output.started)),
            }
        }

        Command::Suggest { session, character } => {
            let session_id = resolve_session(session, &config)?;
            let channel = SuggestionChannel::connect(
                &server_url(&cli.server, &config),
                &session_id,
                config.server.connect_timeout(),
            )
            .await?
            .with_reply_timeout(config.server.suggestion_timeout());

            let questions = channel.suggest(&character).await;
            if let Err(e) = channel.close().await {
                warn!("Failed to close suggestion channel: {}", e);
            }
            let questions = questions?;
            match cli.output {
                OutputFormat::Text => print!(
                    "{}",
                    ConsoleFormatter::format_suggestions(&character, &questions)
                ),
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&questions)),
            }
        }

        Command::Hint { session } => {
            let session_id = resolve_session(session, &config)?;
            let transport: Arc<dyn GameTransport> = Arc::new(http_transport(&cli.server, &config)?);
            let game = GameSession::new(session_id, config.game.max_rounds);
            let use_case = RequestHintUseCase::new(transport).with_transcript_logger(transcript);
            let hint = use_case.execute(&game).await?;
            match cli.output {
                OutputFormat::Text => print!("{}", ConsoleFormatter::format_hint(&hint)),
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&hint)),
            }
        }

        Command::State { session } => {
            let session_id = resolve_session(session, &config)?;
            let transport = http_transport(&cli.server, &config)?;
            let summary = transport.fetch_game_state(&session_id).await?;
            match cli.output {
                OutputFormat::Text => print!("{}", ConsoleFormatter::format_state(&summary)),
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&summary)),
            }
        }

        Command::Ask {
            session,
            character,
            question,
        } => {
            let session_id = resolve_session(session, &config)?;
            let transport: Arc<dyn GameTransport> = Arc::new(http_transport(&cli.server, &config)?);
            let game = open_game(transport.as_ref(), &session_id, &config).await;
            cancel_on_ctrl_c(&game);

            let use_case = AskQuestionUseCase::new(transport).with_transcript_logger(transcript);
            let output = use_case
                .execute(
                    &game,
                    AskQuestionInput::new(character, question),
                    observer.as_ref(),
                )
                .await?;
            print_dialogue(&output, &game, cli.output, live);
        }

        Command::Accuse {
            session,
            accused,
            reasoning,
        } => {
            let session_id = resolve_session(session, &config)?;
            let transport: Arc<dyn GameTransport> = Arc::new(http_transport(&cli.server, &config)?);
            let game = GameSession::new(session_id, config.game.max_rounds);
            cancel_on_ctrl_c(&game);

            let use_case =
                SubmitAccusationUseCase::new(transport).with_transcript_logger(transcript);
            let result = use_case
                .execute(
                    &game,
                    SubmitAccusationInput::new(accused, reasoning),
                    observer.as_ref(),
                )
                .await;
            finish_trial(result, cli.output)?;
        }

        Command::Replay {
            kind,
            file,
            fragment_size,
            name,
        } => {
            let transport: Arc<dyn GameTransport> = Arc::new(
                ReplayTransport::new(file)
                    .with_fragment_size(fragment_size)
                    .with_max_rounds(config.game.max_rounds),
            );
            let game = GameSession::new("replay", config.game.max_rounds);

            match kind {
                ReplayKind::Dialogue => {
                    let use_case =
                        AskQuestionUseCase::new(transport).with_transcript_logger(transcript);
                    let output = use_case
                        .execute(
                            &game,
                            AskQuestionInput::new(name, REPLAY_PROMPT),
                            observer.as_ref(),
                        )
                        .await?;
                    print_dialogue(&output, &game, cli.output, live);
                }
                ReplayKind::Trial => {
                    let use_case =
                        SubmitAccusationUseCase::new(transport).with_transcript_logger(transcript);
                    let result = use_case
                        .execute(
                            &game,
                            SubmitAccusationInput::new(name, REPLAY_PROMPT),
                            observer.as_ref(),
                        )
                        .await;
                    finish_trial(result, cli.output)?;
                }
            }
        }
    }

    Ok(())
}

/// Log warnings and refuse to start on errors.
fn check_config(config: &FileConfig) -> Result<()> {
    let mut fatal = 0;
    for issue in config.validate() {
        match issue.severity {
            Severity::Error => {
                error!("{}", issue.message);
                fatal += 1;
            }
            Severity::Warning => warn!("{}", issue.message),
        }
    }
    if fatal > 0 {
        bail!("Configuration has {} error(s)", fatal);
    }
    Ok(())
}

fn resolve_session(explicit: Option<String>, config: &FileConfig) -> Result<String> {
    match explicit.or_else(|| config.game.session_id.clone()) {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => bail!("No game session. Pass --session or set game.session_id in casefile.toml."),
    }
}

fn server_url(server: &Option<String>, config: &FileConfig) -> String {
    server
        .clone()
        .unwrap_or_else(|| config.server.base_url.clone())
}

fn http_transport(server: &Option<String>, config: &FileConfig) -> Result<HttpGameTransport> {
    let base_url = server_url(server, config);
    info!("Using game server {}", base_url);
    Ok(HttpGameTransport::with_connect_timeout(
        base_url,
        config.server.connect_timeout(),
    )?)
}

/// Resume from the server's round counter, falling back to local defaults.
async fn open_game(
    transport: &dyn GameTransport,
    session_id: &str,
    config: &FileConfig,
) -> GameSession {
    match transport.fetch_game_state(session_id).await {
        Ok(summary) => GameSession::from_summary(&summary),
        Err(e) => {
            warn!("Could not fetch game state, assuming a fresh game: {}", e);
            GameSession::new(session_id, config.game.max_rounds)
        }
    }
}

fn cancel_on_ctrl_c(game: &GameSession) {
    let token = game.cancellation().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}

/// Print the trial record, including a trial cut short by an error.
fn finish_trial(result: Result<TrialSnapshot, TrialFailure>, format: OutputFormat) -> Result<()> {
    match result {
        Ok(snapshot) => {
            print_trial(&snapshot, format);
            Ok(())
        }
        Err(failure) => {
            // A rejected accusation never reached the server; there is nothing to show.
            if !matches!(failure.error, StreamError::Domain(_)) {
                print_trial(&failure.snapshot, format);
            }
            Err(failure.error.into())
        }
    }
}

fn print_trial(snapshot: &TrialSnapshot, format: OutputFormat) {
    match format {
        OutputFormat::Text => print!("{}", ConsoleFormatter::format_trial(snapshot)),
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(snapshot)),
    }
}

fn print_dialogue(output: &AskQuestionOutput, game: &GameSession, format: OutputFormat, live: bool) {
    match format {
        OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(output)),
        OutputFormat::Text if live => print!(
            "{}",
            ConsoleFormatter::format_exchange_summary(output, &game.rounds())
        ),
        OutputFormat::Text => print!(
            "{}",
            ConsoleFormatter::format_dialogue(output, &game.rounds())
        ),
    }
}
