//! Session lifecycle state.
//!
//! ```text
//! Idle ──> Running ──> Completed
//!                 ├──> Cancelled
//!                 └──> Failed
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    /// The event source ended without a stream error.
    Completed,
    /// An external cancellation signal stopped consumption.
    Cancelled,
    /// A stream error, transport error, or protocol violation ended the session.
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Failed
        )
    }

    /// Whether moving to `next` is a legal lifecycle transition.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        match (self, next) {
            (SessionState::Idle, SessionState::Running) => true,
            (SessionState::Running, n) => n.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running => "running",
            SessionState::Completed => "completed",
            SessionState::Cancelled => "cancelled",
            SessionState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!SessionState::Idle.is_terminal());
        assert!(!SessionState::Running.is_terminal());
        assert!(SessionState::Completed.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
        assert!(SessionState::Failed.is_terminal());
    }

    #[test]
    fn legal_transitions() {
        assert!(SessionState::Idle.can_transition_to(SessionState::Running));
        assert!(SessionState::Running.can_transition_to(SessionState::Completed));
        assert!(SessionState::Running.can_transition_to(SessionState::Cancelled));
        assert!(SessionState::Running.can_transition_to(SessionState::Failed));
    }

    #[test]
    fn illegal_transitions() {
        assert!(!SessionState::Idle.can_transition_to(SessionState::Completed));
        assert!(!SessionState::Running.can_transition_to(SessionState::Idle));
        assert!(!SessionState::Completed.can_transition_to(SessionState::Running));
        assert!(!SessionState::Cancelled.can_transition_to(SessionState::Failed));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(SessionState::Cancelled).unwrap(),
            "cancelled"
        );
    }
}
