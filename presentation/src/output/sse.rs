//! Server-Sent Events framing for snapshot relays.
//!
//! Each snapshot becomes one `snapshot` event whose `id` is the snapshot
//! sequence number, so a reconnecting client can resume with
//! `Last-Event-ID`. The terminal snapshot is followed by a `done` event
//! carrying the final state.

use crate::output::formatter::SnapshotFormatter;
use crate::output::json::JsonLinesFormatter;
use relay_domain::Snapshot;

pub struct SseFormatter;

impl SseFormatter {
    pub fn frame(event: &str, id: Option<u64>, data: &str) -> String {
        let mut frame = format!("event: {}\n", event);
        if let Some(id) = id {
            frame.push_str(&format!("id: {}\n", id));
        }
        // Multi-line data must be split across `data:` fields.
        for line in data.split('\n') {
            frame.push_str("data: ");
            frame.push_str(line);
            frame.push('\n');
        }
        frame.push('\n');
        frame
    }

    pub fn snapshot_frame(snapshot: &Snapshot) -> String {
        Self::frame(
            "snapshot",
            Some(snapshot.sequence),
            &JsonLinesFormatter::format(snapshot),
        )
    }
}

impl SnapshotFormatter for SseFormatter {
    fn format_update(&self, snapshot: &Snapshot) -> Option<String> {
        Some(Self::snapshot_frame(snapshot))
    }

    fn format_final(&self, snapshot: &Snapshot) -> String {
        let mut out = Self::snapshot_frame(snapshot);
        out.push_str(&Self::frame("done", None, snapshot.state.as_str()));
        out
    }
}
