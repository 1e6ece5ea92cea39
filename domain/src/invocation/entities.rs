//! Invocation record state machine.
//!
//! Tracks the lifecycle of a single tool call from the moment its request is
//! observed until its result arrives.
//!
//! # State Transitions
//!
//! ```text
//! Pending ──> Succeeded
//!        └──> Failed
//! ```
//!
//! Each transition happens at most once. A second result for the same
//! invocation leaves the record untouched.

use serde::{Deserialize, Serialize};

/// Opaque correlation key for an invocation, unique within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(String);

impl InvocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Into<String>> From<T> for InvocationId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

/// Lifecycle status of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationStatus {
    /// Requested, no result yet.
    Pending,
    /// Result arrived with `is_error == false`.
    Succeeded,
    /// Result arrived with `is_error == true`.
    Failed,
}

impl InvocationStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvocationStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationStatus::Pending => "pending",
            InvocationStatus::Succeeded => "succeeded",
            InvocationStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tool invocation and, once known, its result.
///
/// `id`, `name` and `arguments` are captured at creation and never change.
/// `result` is populated only when the status leaves `Pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationRecord {
    pub id: InvocationId,
    pub name: String,
    pub arguments: serde_json::Value,
    pub status: InvocationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl InvocationRecord {
    /// Create a new record in `Pending` state.
    pub fn new(
        id: impl Into<InvocationId>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            status: InvocationStatus::Pending,
            result: None,
        }
    }

    /// Transition out of `Pending`.
    ///
    /// Returns `false` (and changes nothing) if the record is already terminal.
    pub fn complete(&mut self, content: serde_json::Value, is_error: bool) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = if is_error {
            InvocationStatus::Failed
        } else {
            InvocationStatus::Succeeded
        };
        self.result = Some(content);
        true
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_pending() -> InvocationRecord {
        InvocationRecord::new("call-1", "search", json!({"q": "rust"}))
    }

    #[test]
    fn test_new_is_pending() {
        let record = make_pending();
        assert_eq!(record.status, InvocationStatus::Pending);
        assert!(record.result.is_none());
        assert!(!record.is_terminal());
    }

    #[test]
    fn test_pending_to_succeeded() {
        let mut record = make_pending();
        assert!(record.complete(json!("ok"), false));
        assert_eq!(record.status, InvocationStatus::Succeeded);
        assert_eq!(record.result, Some(json!("ok")));
    }

    #[test]
    fn test_pending_to_failed() {
        let mut record = make_pending();
        assert!(record.complete(json!("permission denied"), true));
        assert_eq!(record.status, InvocationStatus::Failed);
        assert!(record.is_terminal());
    }

    #[test]
    fn test_second_completion_is_ignored() {
        let mut record = make_pending();
        record.complete(json!("first"), false);
        assert!(!record.complete(json!("second"), true));
        assert_eq!(record.status, InvocationStatus::Succeeded);
        assert_eq!(record.result, Some(json!("first")));
    }

    #[test]
    fn test_serialization_omits_pending_result() {
        let value = serde_json::to_value(make_pending()).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["id"], "call-1");
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_invocation_id() {
        let id = InvocationId::new("test-id");
        assert_eq!(id.as_str(), "test-id");
        assert_eq!(id.to_string(), "test-id");

        let id2: InvocationId = "from-str".into();
        assert_eq!(id2.as_str(), "from-str");
    }
}
