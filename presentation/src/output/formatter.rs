//! Output formatter trait

use relay_domain::Snapshot;

/// Turns snapshots into text for stdout.
pub trait SnapshotFormatter {
    /// Render an intermediate snapshot, or `None` if this format only shows
    /// the final document.
    fn format_update(&self, snapshot: &Snapshot) -> Option<String>;

    /// Render the terminal snapshot.
    fn format_final(&self, snapshot: &Snapshot) -> String;
}
