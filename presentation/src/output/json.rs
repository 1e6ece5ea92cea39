//! JSON lines output: one compact snapshot object per line.

use crate::output::formatter::SnapshotFormatter;
use relay_domain::Snapshot;

pub struct JsonLinesFormatter;

impl JsonLinesFormatter {
    pub fn format(snapshot: &Snapshot) -> String {
        serde_json::to_string(snapshot).unwrap_or_else(|_| "{}".to_string())
    }
}

impl SnapshotFormatter for JsonLinesFormatter {
    fn format_update(&self, snapshot: &Snapshot) -> Option<String> {
        Some(Self::format(snapshot))
    }

    fn format_final(&self, snapshot: &Snapshot) -> String {
        Self::format(snapshot)
    }
}
