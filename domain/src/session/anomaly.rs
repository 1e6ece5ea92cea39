//! Non-fatal protocol anomalies.
//!
//! Anomalies are recorded and surfaced in every subsequent snapshot but never
//! halt a session. They are a diagnostic log, never cleared.

use crate::invocation::entities::InvocationId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A result arrived for an id that was never requested.
    OrphanResult,
    /// The same request id was delivered more than once.
    DuplicateInvocationRequest,
    /// A result arrived for an invocation that already has one.
    DuplicateInvocationResult,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::OrphanResult => "orphan_result",
            AnomalyKind::DuplicateInvocationRequest => "duplicate_invocation_request",
            AnomalyKind::DuplicateInvocationResult => "duplicate_invocation_result",
        }
    }
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed anomaly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub id: InvocationId,
    /// 1-based position of the offending event in the stream.
    pub event_index: u64,
}

impl Anomaly {
    pub fn new(kind: AnomalyKind, id: InvocationId, event_index: u64) -> Self {
        Self {
            kind,
            id,
            event_index,
        }
    }
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}) at event #{}", self.kind, self.id, self.event_index)
    }
}

/// Append-only anomaly log with an optional retention cap.
///
/// Once the cap is reached, further anomalies are counted but not stored, so
/// the earliest evidence of corruption is always kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnomalyLog {
    entries: Vec<Anomaly>,
    dropped: u64,
    capacity: Option<usize>,
}

impl AnomalyLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub fn push(&mut self, anomaly: Anomaly) {
        match self.capacity {
            Some(cap) if self.entries.len() >= cap => self.dropped += 1,
            _ => self.entries.push(anomaly),
        }
    }

    pub fn entries(&self) -> &[Anomaly] {
        &self.entries
    }

    /// Anomalies observed but not retained because of the cap.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.dropped == 0
    }
}
