//! CLI entrypoint for agent-relay
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use relay_application::{
    ConversationLogger, EventSource, SessionConfig, SessionController, SnapshotNotifier,
};
use relay_domain::{SessionState, Snapshot};
use relay_infrastructure::{
    ConfigLoader, FileConfig, FileOutputFormat, IdleTimeoutSource, JsonlEventSource,
    JsonlTranscriptLogger,
};
use relay_presentation::{
    Cli, ConsoleFormatter, JsonLinesFormatter, OutputFormat, ProgressReporter, SnapshotFormatter,
    SseFormatter,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    // Held until exit so buffered log lines reach the file.
    let _log_guard = init_logging(&cli)?;

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    config.validate().context("Invalid configuration")?;

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    let session_config = session_config(&cli, &config)?;
    let format = output_format(&cli, &config);

    // === Dependency Injection ===
    let mut controller = SessionController::new(session_config.clone());
    if let Some(logger) = transcript_logger(&cli, &config) {
        controller = controller.with_conversation_logger(logger);
    }

    let source: Box<dyn EventSource> = match cli.input_path() {
        Some(path) => Box::new(
            JsonlEventSource::open(path)
                .await
                .with_context(|| format!("Cannot read events from {}", path.display()))?,
        ),
        None => Box::new(JsonlEventSource::stdin()),
    };
    let source: Box<dyn EventSource> = match session_config.idle_timeout {
        Some(idle) => Box::new(IdleTimeoutSource::new(source, idle)),
        None => source,
    };

    let formatter: Box<dyn SnapshotFormatter> = match format {
        OutputFormat::Text => Box::new(ConsoleFormatter),
        OutputFormat::Json => Box::new(JsonLinesFormatter),
        OutputFormat::Sse => Box::new(SseFormatter),
    };
    let progress = if format == OutputFormat::Text && !cli.quiet {
        ProgressReporter::new()
    } else {
        ProgressReporter::hidden()
    };

    info!(format = ?format, "Starting agent-relay");
    let mut handle = controller.start(source)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;
    let mut output_closed = false;

    loop {
        tokio::select! {
            snapshot = handle.next_snapshot() => {
                let Some(snapshot) = snapshot else { break };
                progress.on_snapshot(&snapshot);
                if output_closed {
                    continue;
                }
                if let Err(e) = emit(formatter.as_ref(), &snapshot) {
                    warn!("Output closed ({}), cancelling session", e);
                    output_closed = true;
                    handle.cancel();
                }
            }
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                warn!("Interrupted, cancelling session");
                handle.cancel();
            }
        }
    }

    let final_snapshot = handle.join().await?;
    info!(
        state = %final_snapshot.state,
        sequence = final_snapshot.sequence,
        "Session finished"
    );

    Ok(ExitCode::from(exit_status(final_snapshot.state)))
}

/// Install the tracing subscriber.
///
/// Logs go to stderr (stdout carries snapshots) or, with `--log-file`, to a
/// file through a non-blocking writer whose guard must outlive the session.
fn init_logging(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = &cli.log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(stderr_ansi(cli))
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("--log-file must name a file: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

fn stderr_ansi(cli: &Cli) -> bool {
    !cli.no_color
}

/// File configuration with CLI flags layered on top.
fn session_config(cli: &Cli, config: &FileConfig) -> Result<SessionConfig> {
    let mut session = config.session_config();

    if let Some(secs) = cli.idle_timeout {
        if secs == 0 {
            bail!("--idle-timeout must be at least 1 second");
        }
        session = session.with_idle_timeout(Some(Duration::from_secs(secs)));
    }
    if let Some(max) = cli.max_anomalies {
        if max == 0 {
            bail!("--max-anomalies must be at least 1");
        }
        session = session.with_max_anomalies(Some(max));
    }
    if cli.emit_unchanged {
        session = session.with_emit_unchanged(true);
    }

    Ok(session)
}

fn output_format(cli: &Cli, config: &FileConfig) -> OutputFormat {
    cli.format.unwrap_or(match config.output.format {
        FileOutputFormat::Text => OutputFormat::Text,
        FileOutputFormat::Json => OutputFormat::Json,
        FileOutputFormat::Sse => OutputFormat::Sse,
    })
}

fn transcript_logger(cli: &Cli, config: &FileConfig) -> Option<Arc<dyn ConversationLogger>> {
    let path = cli
        .transcript
        .clone()
        .or_else(|| config.log.transcript_path.as_ref().map(PathBuf::from))?;

    let mut logger = JsonlTranscriptLogger::new(&path)?;
    if let Some(label) = &cli.label {
        logger = logger.with_label(label.clone());
    }
    info!("Writing transcript to {}", logger.path().display());
    Some(Arc::new(logger))
}

/// Write one rendered snapshot to stdout and flush, so relays see it at once.
fn emit(formatter: &dyn SnapshotFormatter, snapshot: &Snapshot) -> std::io::Result<()> {
    let rendered = if snapshot.is_terminal() {
        Some(formatter.format_final(snapshot))
    } else {
        formatter.format_update(snapshot)
    };
    let Some(mut text) = rendered else {
        return Ok(());
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}

fn exit_status(state: SessionState) -> u8 {
    match state {
        SessionState::Completed => 0,
        SessionState::Cancelled => 130,
        SessionState::Failed | SessionState::Idle | SessionState::Running => 1,
    }
}
