//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Rendered document with a live progress spinner
    Text,
    /// One JSON snapshot per line
    Json,
    /// Server-Sent Events frames, one per snapshot
    Sse,
}

/// CLI arguments for agent-relay
#[derive(Parser, Debug)]
#[command(name = "agent-relay")]
#[command(author, version, about = "Correlate a streaming agent event log into a live document")]
#[command(long_about = r#"
agent-relay reads a stream of agent events (text chunks, tool invocation
requests, tool results, stream errors), matches every result to the
invocation that produced it, and emits snapshots of the reconstructed
document as it grows.

Events are read as JSON lines, one envelope per line:
  {"origin":"reasoner","payload":{"type":"text_chunk","content":"Let me check."}}
  {"origin":"reasoner","payload":{"type":"invocation_request","id":"1","name":"search","arguments":{}}}
  {"origin":"world","payload":{"type":"invocation_result","id":"1","content":"ok","is_error":false}}

Configuration files are loaded from (in priority order):
1. RELAY_* environment variables
2. --config <path>     Explicit config file
3. ./relay.toml        Project-level config
4. ~/.config/agent-relay/config.toml   Global config

Example:
  agent-relay events.jsonl
  tail -f agent.jsonl | agent-relay --format sse --idle-timeout 30
  agent-relay --format json --transcript run.transcript.jsonl events.jsonl
"#)]
pub struct Cli {
    /// Event log to read (JSON lines); reads stdin when omitted or "-"
    pub input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Fail the session if no event arrives within this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub idle_timeout: Option<u64>,

    /// Maximum number of anomalies retained in snapshots
    #[arg(long, value_name = "N")]
    pub max_anomalies: Option<usize>,

    /// Emit a snapshot for every event, even when nothing visible changed
    #[arg(long)]
    pub emit_unchanged: bool,

    /// Append a JSONL transcript of the session to this file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Label attached to every transcript line
    #[arg(long, value_name = "LABEL")]
    pub label: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write diagnostic logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// The input file, or `None` for stdin.
    pub fn input_path(&self) -> Option<&PathBuf> {
        self.input.as_ref().filter(|p| p.as_os_str() != "-")
    }
}
