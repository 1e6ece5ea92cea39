//! Session parameters: correlation loop control.
//!
//! [`SessionConfig`] groups the static parameters that control how a
//! [`SessionController`](crate::use_cases::session_controller::SessionController)
//! consumes its event source and emits snapshots. These are application-layer
//! concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum anomalies retained in snapshots; `None` keeps all of them.
    pub max_anomalies: Option<usize>,
    /// Emit a snapshot even for events that leave the document unchanged.
    pub emit_unchanged: bool,
    /// Budget for waiting on the next event. Enforced by wrapping the event
    /// source, which then synthesizes a stream error.
    pub idle_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_anomalies: Some(1000),
            emit_unchanged: false,
            idle_timeout: None,
        }
    }
}

impl SessionConfig {
    // ==================== Builder Methods ====================

    pub fn with_max_anomalies(mut self, max: Option<usize>) -> Self {
        self.max_anomalies = max;
        self
    }

    pub fn with_emit_unchanged(mut self, emit: bool) -> Self {
        self.emit_unchanged = emit;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }
}
