//! Session transcripts.
//!
//! Provides [`JsonlTranscriptLogger`], a JSONL file writer that implements
//! the [`ConversationLogger`](relay_application::ConversationLogger) port.

mod transcript;

pub use transcript::JsonlTranscriptLogger;
