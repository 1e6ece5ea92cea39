//! Presentation layer for agent-relay
//!
//! This crate contains CLI definitions, snapshot formatters,
//! and the terminal progress reporter.

pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat};
pub use output::console::ConsoleFormatter;
pub use output::formatter::SnapshotFormatter;
pub use output::json::JsonLinesFormatter;
pub use output::sse::SseFormatter;
pub use progress::reporter::ProgressReporter;
