//! CLI entrypoint for palaver
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod backends;

use anyhow::{Context, Result, bail};
use clap::Parser;
use palaver_application::{
    NoProgress, PalaverConfig, ProgressNotifier, RequestDispatcher, SessionRegistry,
};
use palaver_domain::{GenerationRequest, OutputFormat};
use palaver_infrastructure::{ConfigLoader, JsonlConversationLogger};
use palaver_presentation::{
    ChatRepl, Cli, Command, ConsoleFormatter, ProgressReporter, ReplConfig, SimpleProgress,
    load_audio_request,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize logging based on verbosity level; `RUST_LOG` wins when set.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match cli.log_file {
        Some(ref path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let log_guard = init_logging(&cli)?;
    info!("Starting palaver");

    // === Configuration ===
    let file_config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).context("failed to load configuration")?
    };

    let issues = file_config.validate();
    for issue in &issues {
        eprintln!("{}", ConsoleFormatter::format_issue(issue));
    }
    if PalaverConfig::has_errors(&issues) {
        bail!("configuration has errors");
    }
    let (config, _) = file_config.to_palaver_config();

    // === Dependency Injection ===
    let backends = backends::assemble(&file_config).await?;
    let mut dispatcher = RequestDispatcher::new(backends, config.clone());
    if let Some(ref path) = cli.transcript {
        let logger = JsonlConversationLogger::open(path)
            .with_context(|| format!("cannot open transcript {}", path.display()))?;
        dispatcher = dispatcher.with_logger(Arc::new(logger));
    }
    let dispatcher = Arc::new(dispatcher);
    let registry = SessionRegistry::new(config.dispatch().session_idle_timeout);
    let (session_id, session) = registry.create();

    let request = match cli.command.clone().unwrap_or(Command::Chat) {
        Command::Chat => {
            let repl = ChatRepl::new(dispatcher, session)
                .with_config(ReplConfig::default().with_progress(!cli.quiet));
            repl.run().await?;
            registry.end(session_id);
            return Ok(());
        }
        Command::Ask { input } => GenerationRequest::text(input),
        Command::Image { prompt } => GenerationRequest::image(prompt),
        Command::Speak { text } => GenerationRequest::speech(text),
        Command::Transcribe { path } => load_audio_request(&path)
            .await
            .with_context(|| format!("cannot read audio file {}", path.display()))?,
    };

    // Single request mode
    let format: OutputFormat = cli.format.into();
    let progress: Box<dyn ProgressNotifier> = match (cli.quiet, format) {
        (true, _) => Box::new(NoProgress),
        (false, OutputFormat::Json) => Box::new(SimpleProgress),
        (false, OutputFormat::Text) => Box::new(ProgressReporter::new()),
    };
    let result = dispatcher
        .handle_with_progress(&session, request, progress.as_ref())
        .await;
    registry.end(session_id);

    println!("{}", ConsoleFormatter::render(&result, format));

    if let Some(failure) = result.failure() {
        warn!(code = failure.code(), "Request failed");
        drop(log_guard);
        std::process::exit(1);
    }
    Ok(())
}
