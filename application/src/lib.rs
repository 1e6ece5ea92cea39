//! Application layer for agent-relay
//!
//! This crate contains the session controller use case, port definitions,
//! and application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::SessionConfig;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    event_source::{ChannelEventSource, EventSource, SourceError, StreamEventSource},
    snapshot_notifier::{ChannelNotifier, NoSnapshots, SnapshotNotifier},
};
pub use use_cases::session_controller::{SessionController, SessionError, SessionHandle};
