//! Infrastructure layer for agent-relay
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: event sources, transcripts, and
//! configuration file loading.

pub mod config;
pub mod logging;
pub mod source;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLogConfig, FileOutputConfig,
    FileOutputFormat, FileSessionConfig,
};
pub use logging::JsonlTranscriptLogger;
pub use source::{IdleTimeoutSource, JsonlEventSource};
