//! Render-ready, self-contained views of a document.
//!
//! Views resolve the invocation ids held by tool groups into full records,
//! so they can be serialized and shipped without the ledger.

use super::entities::{Document, Section, SectionTag};
use crate::invocation::entities::InvocationRecord;
use crate::invocation::ledger::InvocationLedger;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionView {
    Text { text: String },
    Tools { invocations: Vec<InvocationRecord> },
}

impl SectionView {
    pub fn tag(&self) -> SectionTag {
        match self {
            SectionView::Text { .. } => SectionTag::Text,
            SectionView::Tools { .. } => SectionTag::Tools,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentView {
    pub sections: Vec<SectionView>,
}

impl DocumentView {
    /// Resolve `document` against `ledger`.
    pub fn resolve(document: &Document, ledger: &InvocationLedger) -> Self {
        let sections = document
            .sections()
            .iter()
            .map(|section| match section {
                Section::Text(text) => SectionView::Text {
                    text: text.text.clone(),
                },
                Section::Tools(group) => SectionView::Tools {
                    invocations: group
                        .invocations
                        .iter()
                        .filter_map(|id| ledger.get(id).cloned())
                        .collect(),
                },
            })
            .collect();
        Self { sections }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// All invocations across every tool group, in request order.
    pub fn invocations(&self) -> impl Iterator<Item = &InvocationRecord> {
        self.sections
            .iter()
            .filter_map(|section| match section {
                SectionView::Tools { invocations } => Some(invocations),
                SectionView::Text { .. } => None,
            })
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::entities::{InvocationId, InvocationStatus};
    use serde_json::json;

    #[test]
    fn resolve_reflects_ledger_updates() {
        let mut ledger = InvocationLedger::new();
        let mut doc = Document::new();
        let id = InvocationId::new("1");

        ledger.record_request(&id, "search", &json!({}));
        doc.append_invocation(id.clone());

        let before = DocumentView::resolve(&doc, &ledger);
        assert_eq!(
            before.invocations().next().unwrap().status,
            InvocationStatus::Pending
        );

        ledger.record_result(&id, &json!("ok"), false);
        let after = DocumentView::resolve(&doc, &ledger);
        assert_eq!(
            after.invocations().next().unwrap().status,
            InvocationStatus::Succeeded
        );
    }

    #[test]
    fn serializes_tagged_sections() {
        let mut ledger = InvocationLedger::new();
        let mut doc = Document::new();
        doc.append_text("hi");
        ledger.record_request(&"1".into(), "search", &json!({"q": "x"}));
        doc.append_invocation("1".into());

        let value = serde_json::to_value(DocumentView::resolve(&doc, &ledger)).unwrap();
        assert_eq!(value[0], json!({"kind": "text", "text": "hi"}));
        assert_eq!(value[1]["kind"], "tools");
        assert_eq!(value[1]["invocations"][0]["name"], "search");
        assert_eq!(value[1]["invocations"][0]["status"], "pending");
    }
}
