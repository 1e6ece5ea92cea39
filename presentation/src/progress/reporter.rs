//! Progress reporting for running sessions

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use relay_application::SnapshotNotifier;
use relay_domain::{SessionState, Snapshot};
use std::time::Duration;

/// Live spinner showing section, pending-invocation and anomaly counts.
///
/// Draws to stderr, so stdout stays clean for the rendered document.
/// indicatif hides the spinner automatically when stderr is not a terminal.
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::spinner_style());
        bar.set_prefix("relay");
        bar.set_message("waiting for events...");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// A reporter that never draws; used with `--quiet`.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn status_message(snapshot: &Snapshot) -> String {
        let mut message = format!(
            "{} sections, {} pending",
            snapshot.document.len(),
            snapshot.pending_invocations()
        );
        let anomalies = snapshot.anomalies.len() as u64 + snapshot.anomalies_dropped;
        if anomalies > 0 {
            message.push_str(&format!(", {} anomalies", anomalies));
        }
        message
    }

    fn finish_message(snapshot: &Snapshot) -> String {
        let state = match snapshot.state {
            SessionState::Completed => "completed".green(),
            SessionState::Cancelled => "cancelled".yellow(),
            SessionState::Failed => "failed".red(),
            SessionState::Idle | SessionState::Running => snapshot.state.as_str().normal(),
        };
        format!("{} ({})", state, Self::status_message(snapshot))
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotNotifier for ProgressReporter {
    fn on_snapshot(&self, snapshot: &Snapshot) {
        if snapshot.is_terminal() {
            self.bar.finish_with_message(Self::finish_message(snapshot));
        } else {
            self.bar.set_message(Self::status_message(snapshot));
        }
    }
}
