//! Section builder: folds the event stream into a [`Document`].
//!
//! The builder owns the session's [`InvocationLedger`] and applies one
//! [`EventEnvelope`] at a time:
//!
//! | Payload | Effect |
//! |---------|--------|
//! | `TextChunk` | extend the open text section, or open a new one |
//! | `InvocationRequest` (new id) | freeze open text, join/open a tool group |
//! | `InvocationRequest` (known id) | nothing; reported as an anomaly |
//! | `InvocationResult` | update the ledger only; the document shape is untouched |
//! | `StreamError` | mark the builder terminal |
//!
//! Each call either fully applies its event or returns an error without
//! touching state, so any view taken between calls is consistent.

use super::entities::{Document, TextAppend};
use super::view::DocumentView;
use crate::core::error::DomainError;
use crate::event::envelope::{EventEnvelope, Payload};
use crate::invocation::entities::InvocationId;
use crate::invocation::ledger::{InvocationLedger, RequestOutcome, ResultOutcome};
use crate::session::anomaly::AnomalyKind;

/// A visible change to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    SectionOpened,
    TextAppended,
    InvocationAdded,
    InvocationUpdated,
}

/// What applying one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fold {
    /// The document's visible shape changed.
    Changed(Change),
    /// Accepted, but nothing visible changed (e.g. an empty text chunk).
    Unchanged,
    /// A non-fatal protocol anomaly; the document is unchanged.
    Anomaly { kind: AnomalyKind, id: InvocationId },
    /// A `StreamError` ended the stream.
    Terminated { message: String },
}

#[derive(Debug, Clone, Default)]
pub struct SectionBuilder {
    document: Document,
    ledger: InvocationLedger,
    terminal: Option<String>,
}

impl SectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event.
    ///
    /// Fails with [`DomainError::Protocol`] on an origin violation and with
    /// [`DomainError::Terminal`] once a `StreamError` has been applied. In
    /// both cases the builder is left exactly as it was.
    pub fn apply(&mut self, event: &EventEnvelope) -> Result<Fold, DomainError> {
        if let Some(message) = &self.terminal {
            return Err(DomainError::Terminal(message.clone()));
        }
        event.validate()?;

        let fold = match &event.payload {
            Payload::TextChunk { content } => match self.document.append_text(content) {
                TextAppend::Opened => Fold::Changed(Change::SectionOpened),
                TextAppend::Extended => Fold::Changed(Change::TextAppended),
                TextAppend::Noop => Fold::Unchanged,
            },
            Payload::InvocationRequest {
                id,
                name,
                arguments,
            } => match self.ledger.record_request(id, name, arguments).0 {
                RequestOutcome::Created => {
                    if self.document.append_invocation(id.clone()) {
                        Fold::Changed(Change::SectionOpened)
                    } else {
                        Fold::Changed(Change::InvocationAdded)
                    }
                }
                RequestOutcome::Existing => Fold::Anomaly {
                    kind: AnomalyKind::DuplicateInvocationRequest,
                    id: id.clone(),
                },
            },
            Payload::InvocationResult {
                id,
                content,
                is_error,
            } => match self.ledger.record_result(id, content, *is_error) {
                ResultOutcome::Applied => Fold::Changed(Change::InvocationUpdated),
                ResultOutcome::DuplicateIgnored => Fold::Anomaly {
                    kind: AnomalyKind::DuplicateInvocationResult,
                    id: id.clone(),
                },
                ResultOutcome::Orphan => Fold::Anomaly {
                    kind: AnomalyKind::OrphanResult,
                    id: id.clone(),
                },
            },
            Payload::StreamError { message } => {
                self.terminal = Some(message.clone());
                Fold::Terminated {
                    message: message.clone(),
                }
            }
        };
        Ok(fold)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn ledger(&self) -> &InvocationLedger {
        &self.ledger
    }

    /// The carried `StreamError` message, once terminal.
    pub fn terminal(&self) -> Option<&str> {
        self.terminal.as_deref()
    }

    /// Render the open document.
    pub fn view(&self) -> DocumentView {
        DocumentView::resolve(&self.document, &self.ledger)
    }

    /// Render the document as it should be emitted in a terminal state.
    pub fn finalized_view(&self) -> DocumentView {
        DocumentView::resolve(&self.document.finalized(), &self.ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::entities::SectionTag;
    use crate::document::view::SectionView;
    use crate::event::envelope::Origin;
    use crate::invocation::entities::InvocationStatus;
    use serde_json::json;

    fn fold_all(events: &[EventEnvelope]) -> SectionBuilder {
        let mut builder = SectionBuilder::new();
        for event in events {
            builder.apply(event).unwrap();
        }
        builder
    }

    fn tags(view: &DocumentView) -> Vec<SectionTag> {
        view.sections.iter().map(SectionView::tag).collect()
    }

    #[test]
    fn text_tool_text_round() {
        let builder = fold_all(&[
            EventEnvelope::text("Let me check."),
            EventEnvelope::request("1", "search", json!({})),
            EventEnvelope::result("1", json!("ok"), false),
            EventEnvelope::text("Found it."),
        ]);
        let view = builder.finalized_view();
        assert_eq!(
            tags(&view),
            vec![SectionTag::Text, SectionTag::Tools, SectionTag::Text]
        );
        assert_eq!(
            view.sections[0],
            SectionView::Text {
                text: "Let me check.".to_string()
            }
        );
        let record = view.invocations().next().unwrap();
        assert_eq!(record.id.as_str(), "1");
        assert_eq!(record.name, "search");
        assert_eq!(record.status, InvocationStatus::Succeeded);
        assert_eq!(record.result, Some(json!("ok")));
        assert_eq!(
            view.sections[2],
            SectionView::Text {
                text: "Found it.".to_string()
            }
        );
    }

    #[test]
    fn batched_requests_share_group_regardless_of_result_order() {
        let builder = fold_all(&[
            EventEnvelope::request("1", "search", json!({})),
            EventEnvelope::request("2", "fetch", json!({})),
            EventEnvelope::result("2", json!("b"), false),
            EventEnvelope::result("1", json!("a"), false),
        ]);
        let view = builder.finalized_view();
        assert_eq!(view.len(), 1);
        let ids: Vec<&str> = view.invocations().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!(view
            .invocations()
            .all(|r| r.status == InvocationStatus::Succeeded));
    }

    #[test]
    fn orphan_result_leaves_document_untouched() {
        let mut builder = SectionBuilder::new();
        let fold = builder
            .apply(&EventEnvelope::result("99", json!("ok"), false))
            .unwrap();
        assert_eq!(
            fold,
            Fold::Anomaly {
                kind: AnomalyKind::OrphanResult,
                id: "99".into()
            }
        );
        assert!(builder.document().is_empty());
        assert!(builder.ledger().is_empty());
    }

    #[test]
    fn duplicate_request_adds_no_entry() {
        let mut builder = SectionBuilder::new();
        let request = EventEnvelope::request("1", "search", json!({}));
        assert_eq!(
            builder.apply(&request).unwrap(),
            Fold::Changed(Change::SectionOpened)
        );
        assert_eq!(
            builder.apply(&request).unwrap(),
            Fold::Anomaly {
                kind: AnomalyKind::DuplicateInvocationRequest,
                id: "1".into()
            }
        );
        assert_eq!(builder.view().invocations().count(), 1);
    }

    #[test]
    fn duplicate_request_after_text_does_not_close_text() {
        let builder = fold_all(&[
            EventEnvelope::request("1", "search", json!({})),
            EventEnvelope::text("thinking"),
            EventEnvelope::request("1", "search", json!({})),
            EventEnvelope::text(" more"),
        ]);
        let view = builder.view();
        assert_eq!(view.len(), 2);
        assert_eq!(
            view.sections[1],
            SectionView::Text {
                text: "thinking more".to_string()
            }
        );
    }

    #[test]
    fn duplicate_result_is_reported_and_ignored() {
        let mut builder = fold_all(&[
            EventEnvelope::request("1", "search", json!({})),
            EventEnvelope::result("1", json!("first"), false),
        ]);
        let fold = builder
            .apply(&EventEnvelope::result("1", json!("second"), true))
            .unwrap();
        assert_eq!(
            fold,
            Fold::Anomaly {
                kind: AnomalyKind::DuplicateInvocationResult,
                id: "1".into()
            }
        );
        let record = builder.ledger().get(&"1".into()).unwrap();
        assert_eq!(record.result, Some(json!("first")));
    }

    #[test]
    fn failed_result_is_per_invocation() {
        let mut builder = fold_all(&[
            EventEnvelope::request("1", "search", json!({})),
            EventEnvelope::result("1", json!("denied"), true),
        ]);
        assert!(builder.terminal().is_none());
        assert!(builder.apply(&EventEnvelope::text("retrying")).is_ok());
        let record = builder.ledger().get(&"1".into()).unwrap();
        assert_eq!(record.status, InvocationStatus::Failed);
    }

    #[test]
    fn stream_error_makes_builder_terminal() {
        let mut builder = fold_all(&[EventEnvelope::text("partial")]);
        let fold = builder
            .apply(&EventEnvelope::stream_error("connection lost"))
            .unwrap();
        assert_eq!(
            fold,
            Fold::Terminated {
                message: "connection lost".to_string()
            }
        );
        assert_eq!(builder.terminal(), Some("connection lost"));

        let err = builder.apply(&EventEnvelope::text("late")).unwrap_err();
        assert_eq!(err, DomainError::Terminal("connection lost".to_string()));
        assert_eq!(
            builder.finalized_view().sections,
            vec![SectionView::Text {
                text: "partial".to_string()
            }]
        );
    }

    #[test]
    fn origin_violation_leaves_state_untouched() {
        let mut builder = fold_all(&[EventEnvelope::request("1", "search", json!({}))]);
        let bad = EventEnvelope::new(
            Origin::Reasoner,
            Payload::InvocationResult {
                id: "1".into(),
                content: json!("ok"),
                is_error: false,
            },
        );
        assert!(matches!(
            builder.apply(&bad),
            Err(DomainError::Protocol(_))
        ));
        assert_eq!(
            builder.ledger().get(&"1".into()).unwrap().status,
            InvocationStatus::Pending
        );
    }

    #[test]
    fn empty_chunk_opens_section_after_tools() {
        let mut builder = fold_all(&[EventEnvelope::request("1", "search", json!({}))]);
        assert_eq!(
            builder.apply(&EventEnvelope::text("")).unwrap(),
            Fold::Changed(Change::SectionOpened)
        );
        assert_eq!(builder.view().len(), 2);
        assert_eq!(builder.finalized_view().len(), 1);
        assert_eq!(
            builder.apply(&EventEnvelope::text("")).unwrap(),
            Fold::Unchanged
        );
    }

    #[test]
    fn replay_is_deterministic() {
        let events = vec![
            EventEnvelope::text("a"),
            EventEnvelope::request("1", "search", json!({"q": 1})),
            EventEnvelope::request("2", "fetch", json!({"u": 2})),
            EventEnvelope::result("1", json!("x"), false),
            EventEnvelope::text("b"),
            EventEnvelope::request("3", "search", json!({})),
            EventEnvelope::result("3", json!("y"), true),
        ];
        let first = fold_all(&events).finalized_view();
        let second = fold_all(&events).finalized_view();
        assert_eq!(first, second);
    }

    #[test]
    fn truncated_failure_matches_truncated_success() {
        let events = vec![
            EventEnvelope::text("a"),
            EventEnvelope::request("1", "search", json!({})),
            EventEnvelope::result("1", json!("x"), false),
            EventEnvelope::text(""),
            EventEnvelope::request("2", "fetch", json!({})),
        ];
        for n in 0..=events.len() {
            let clean = fold_all(&events[..n]).finalized_view();
            let mut failed = fold_all(&events[..n]);
            failed
                .apply(&EventEnvelope::stream_error("cut"))
                .unwrap();
            assert_eq!(failed.finalized_view(), clean, "diverged after {} events", n);
        }
    }

    #[test]
    fn sections_always_alternate() {
        let events = vec![
            EventEnvelope::text("a"),
            EventEnvelope::text("b"),
            EventEnvelope::request("1", "s", json!({})),
            EventEnvelope::request("1", "s", json!({})),
            EventEnvelope::request("2", "s", json!({})),
            EventEnvelope::text(""),
            EventEnvelope::text("c"),
            EventEnvelope::result("9", json!(null), false),
            EventEnvelope::request("3", "s", json!({})),
        ];
        let mut builder = SectionBuilder::new();
        for event in &events {
            builder.apply(event).unwrap();
            assert!(builder.document().is_alternating());
        }
    }
}
