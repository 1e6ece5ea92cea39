//! Snapshot notification port.
//!
//! [`SnapshotNotifier`] is an **output port** that consumers implement to
//! receive session snapshots: a terminal renderer, an SSE relay, a test
//! recorder. The concurrency substrate is the implementer's choice; the
//! session only promises to call it in order, from one task.
//!
//! # Example Implementation
//!
//! ```ignore
//! use relay_application::ports::snapshot_notifier::SnapshotNotifier;
//!
//! struct PrintState;
//!
//! impl SnapshotNotifier for PrintState {
//!     fn on_snapshot(&self, snapshot: &Snapshot) {
//!         println!("#{} {}", snapshot.sequence, snapshot.state);
//!     }
//! }
//! ```

use relay_domain::Snapshot;
use tokio::sync::mpsc;

/// Receives snapshots as a session progresses.
pub trait SnapshotNotifier: Send + Sync {
    /// Called on every visible change, and once more with the final snapshot.
    fn on_snapshot(&self, snapshot: &Snapshot);
}

/// No-op implementation for when only the final snapshot matters
pub struct NoSnapshots;

impl SnapshotNotifier for NoSnapshots {
    fn on_snapshot(&self, _snapshot: &Snapshot) {}
}

/// Forwards snapshots into an unbounded channel.
///
/// A dropped receiver is not an error: the session keeps running and its
/// final snapshot is still returned to whoever awaits it.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Snapshot>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<Snapshot>) -> Self {
        Self { tx }
    }
}

impl SnapshotNotifier for ChannelNotifier {
    fn on_snapshot(&self, snapshot: &Snapshot) {
        let _ = self.tx.send(snapshot.clone());
    }
}
