//! Document and section types.
//!
//! A [`Document`] is an ordered run of sections that alternate between free
//! text and groups of tool activity. Only the last section is open; every
//! earlier section is frozen because the mutating methods only ever touch
//! the tail.

use crate::invocation::entities::InvocationId;
use serde::{Deserialize, Serialize};

/// Discriminant of a [`Section`], used for alternation checks and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionTag {
    Text,
    Tools,
}

/// Free-form reasoning text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSection {
    pub text: String,
}

/// Tool invocations requested within one reasoning turn, in request order.
///
/// Holds ids, not records: status changes made in the ledger show up in every
/// rendered view without touching the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolGroupSection {
    pub invocations: Vec<InvocationId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    Text(TextSection),
    Tools(ToolGroupSection),
}

impl Section {
    pub fn tag(&self) -> SectionTag {
        match self {
            Section::Text(_) => SectionTag::Text,
            Section::Tools(_) => SectionTag::Tools,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Section::Text(section) => Some(&section.text),
            Section::Tools(_) => None,
        }
    }

    pub fn as_tools(&self) -> Option<&[InvocationId]> {
        match self {
            Section::Tools(section) => Some(&section.invocations),
            Section::Text(_) => None,
        }
    }
}

/// How a text chunk changed the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAppend {
    /// A new text section was opened for the chunk.
    Opened,
    /// The chunk extended the open text section.
    Extended,
    /// The chunk was empty and the open section was already text.
    Noop,
}

/// Ordered sequence of sections, in causal order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    sections: Vec<Section>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The open (last) section, if any.
    pub fn current(&self) -> Option<&Section> {
        self.sections.last()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Append reasoning text.
    ///
    /// Extends the open text section, or opens a new one when the document is
    /// empty or the tail is a tool group. An empty chunk still opens a section
    /// in the latter case.
    pub fn append_text(&mut self, content: &str) -> TextAppend {
        if let Some(Section::Text(open)) = self.sections.last_mut() {
            if content.is_empty() {
                return TextAppend::Noop;
            }
            open.text.push_str(content);
            return TextAppend::Extended;
        }
        self.sections.push(Section::Text(TextSection {
            text: content.to_string(),
        }));
        TextAppend::Opened
    }

    /// Append an invocation reference.
    ///
    /// Joins the open tool group if the tail is one (back-to-back requests in
    /// one turn), otherwise freezes the tail and opens a new group. Returns
    /// `true` when a new group was opened.
    pub fn append_invocation(&mut self, id: InvocationId) -> bool {
        if let Some(Section::Tools(group)) = self.sections.last_mut() {
            group.invocations.push(id);
            return false;
        }
        self.sections.push(Section::Tools(ToolGroupSection {
            invocations: vec![id],
        }));
        true
    }

    /// Copy of the document with a trailing empty text section pruned.
    ///
    /// Used whenever the document is emitted in a terminal state, so a
    /// section that never received content is never shown.
    pub fn finalized(&self) -> Document {
        let mut sections = self.sections.clone();
        if matches!(sections.last(), Some(Section::Text(t)) if t.text.is_empty()) {
            sections.pop();
        }
        Document { sections }
    }

    /// Whether no two adjacent sections share a tag.
    pub fn is_alternating(&self) -> bool {
        self.sections
            .windows(2)
            .all(|pair| pair[0].tag() != pair[1].tag())
    }
}
