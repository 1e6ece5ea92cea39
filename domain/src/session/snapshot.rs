//! Snapshot: a self-contained view of one session at one point in time.
//!
//! Snapshots only ever add or close sections and promote invocation status,
//! so a relay may serialize each one independently and a consumer that only
//! applies the latest one still sees a consistent document.

use super::anomaly::Anomaly;
use super::state::SessionState;
use crate::document::view::DocumentView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Per-session counter, starting at 1.
    pub sequence: u64,
    pub state: SessionState,
    pub document: DocumentView,
    /// Anomalies observed so far, oldest first. Capped by the session's
    /// `max_anomalies`; anything past the cap is only counted in
    /// `anomalies_dropped`.
    pub anomalies: Vec<Anomaly>,
    /// Anomalies observed but not retained because of the configured cap.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub anomalies_dropped: u64,
    /// Fatal error detail, present only in the `failed` state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl Snapshot {
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Invocations still waiting for a result.
    pub fn pending_invocations(&self) -> usize {
        self.document
            .invocations()
            .filter(|r| !r.status.is_terminal())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::view::SectionView;
    use crate::invocation::entities::InvocationRecord;
    use crate::session::anomaly::AnomalyKind;
    use serde_json::json;

    fn sample() -> Snapshot {
        Snapshot {
            sequence: 3,
            state: SessionState::Running,
            document: DocumentView {
                sections: vec![
                    SectionView::Text {
                        text: "Let me check.".to_string(),
                    },
                    SectionView::Tools {
                        invocations: vec![InvocationRecord::new("1", "search", json!({}))],
                    },
                ],
            },
            anomalies: vec![Anomaly::new(AnomalyKind::OrphanResult, "99".into(), 2)],
            anomalies_dropped: 0,
            error: None,
        }
    }

    #[test]
    fn serializes_relay_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["sequence"], 3);
        assert_eq!(value["state"], "running");
        assert_eq!(value["document"][0]["kind"], "text");
        assert_eq!(value["document"][1]["invocations"][0]["status"], "pending");
        assert_eq!(value["anomalies"][0]["kind"], "orphan_result");
        assert!(value.get("error").is_none());
        assert!(value.get("anomalies_dropped").is_none());
    }

    #[test]
    fn deserializes_what_it_serializes() {
        let snapshot = sample();
        let text = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn counts_pending_invocations() {
        assert_eq!(sample().pending_invocations(), 1);
        assert!(!sample().is_terminal());
    }
}
