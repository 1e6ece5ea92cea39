//! Domain layer for agent-relay
//!
//! This crate contains the core correlation logic, entities, and value objects.
//! It has no dependencies on async runtimes, I/O, or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Event Envelope
//!
//! An agent emits one ordered stream of [`EventEnvelope`]s: reasoning text,
//! tool requests, tool results, and terminal stream errors.
//!
//! ## Invocation Ledger
//!
//! [`InvocationLedger`] correlates every tool result to the request that
//! produced it, keyed by [`InvocationId`], and suppresses duplicates.
//!
//! ## Section Builder
//!
//! [`SectionBuilder`] folds the stream into a [`Document`] of alternating
//! text and tool-group sections. [`Snapshot`]s render it for consumers.

pub mod core;
pub mod document;
pub mod event;
pub mod invocation;
pub mod session;

// Re-export commonly used types
pub use crate::core::error::{DomainError, ProtocolViolation};
pub use crate::core::string::{preview_value, truncate};
pub use document::{
    builder::{Change, Fold, SectionBuilder},
    entities::{Document, Section, SectionTag, TextSection, ToolGroupSection},
    view::{DocumentView, SectionView},
};
pub use event::envelope::{EventEnvelope, Origin, Payload};
pub use invocation::{
    entities::{InvocationId, InvocationRecord, InvocationStatus},
    ledger::{InvocationLedger, RequestOutcome, ResultOutcome},
};
pub use session::{
    anomaly::{Anomaly, AnomalyKind, AnomalyLog},
    snapshot::Snapshot,
    state::SessionState,
};
