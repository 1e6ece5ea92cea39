//! Console output formatter for session snapshots

use crate::output::formatter::SnapshotFormatter;
use colored::Colorize;
use relay_domain::{
    InvocationRecord, InvocationStatus, SectionView, SessionState, Snapshot, preview_value,
};

/// Maximum characters of arguments/results shown per invocation line.
const PREVIEW_LEN: usize = 80;

/// Formats the reconstructed document for terminal display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete snapshot
    pub fn format(snapshot: &Snapshot) -> String {
        let mut output = String::new();

        for section in &snapshot.document.sections {
            match section {
                SectionView::Text { text } => {
                    output.push_str(text);
                    if !text.ends_with('\n') {
                        output.push('\n');
                    }
                }
                SectionView::Tools { invocations } => {
                    output.push('\n');
                    for record in invocations {
                        output.push_str(&Self::invocation_line(record));
                    }
                    output.push('\n');
                }
            }
        }

        if !snapshot.anomalies.is_empty() || snapshot.anomalies_dropped > 0 {
            output.push_str(&Self::section_header("Anomalies"));
            for anomaly in &snapshot.anomalies {
                output.push_str(&format!("  {} {}\n", "!".yellow(), anomaly));
            }
            if snapshot.anomalies_dropped > 0 {
                output.push_str(&format!(
                    "  {}\n",
                    format!("... {} more not retained", snapshot.anomalies_dropped).dimmed()
                ));
            }
        }

        if let Some(error) = &snapshot.error {
            output.push_str(&format!("\n{} {}\n", "Error:".red().bold(), error));
        }

        output.push_str(&Self::footer(snapshot));
        output
    }

    fn invocation_line(record: &InvocationRecord) -> String {
        let marker = match record.status {
            InvocationStatus::Pending => "..".dimmed(),
            InvocationStatus::Succeeded => "v".green(),
            InvocationStatus::Failed => "x".red(),
        };

        let mut line = format!(
            "  {} {}({})\n",
            marker,
            record.name.bold(),
            preview_value(&record.arguments, PREVIEW_LEN).dimmed()
        );

        if let Some(result) = &record.result {
            let preview = preview_value(result, PREVIEW_LEN);
            let preview = Self::indent(&preview, "      ");
            line.push_str(&match record.status {
                InvocationStatus::Failed => format!("{}\n", preview.red()),
                _ => format!("{}\n", preview),
            });
        }

        line
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer(snapshot: &Snapshot) -> String {
        let state = match snapshot.state {
            SessionState::Completed => snapshot.state.as_str().green(),
            SessionState::Cancelled => snapshot.state.as_str().yellow(),
            SessionState::Failed => snapshot.state.as_str().red(),
            SessionState::Idle | SessionState::Running => snapshot.state.as_str().normal(),
        };
        let invocations = snapshot.document.invocations().count();
        format!(
            "\n{} {} ({} sections, {} invocations, {} anomalies)\n",
            "Session".cyan().bold(),
            state.bold(),
            snapshot.document.len(),
            invocations,
            snapshot.anomalies.len() as u64 + snapshot.anomalies_dropped,
        )
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl SnapshotFormatter for ConsoleFormatter {
    fn format_update(&self, _snapshot: &Snapshot) -> Option<String> {
        None
    }

    fn format_final(&self, snapshot: &Snapshot) -> String {
        Self::format(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_domain::{Anomaly, AnomalyKind, DocumentView};
    use serde_json::json;

    fn finished() -> Snapshot {
        let mut ok = InvocationRecord::new("1", "search", json!({"q": "rust"}));
        ok.complete(json!("3 results"), false);
        let mut failed = InvocationRecord::new("2", "fetch", json!({}));
        failed.complete(json!("404"), true);

        Snapshot {
            sequence: 5,
            state: SessionState::Failed,
            document: DocumentView {
                sections: vec![
                    SectionView::Text {
                        text: "Let me check.".to_string(),
                    },
                    SectionView::Tools {
                        invocations: vec![ok, failed],
                    },
                    SectionView::Text {
                        text: "Done.".to_string(),
                    },
                ],
            },
            anomalies: vec![Anomaly::new(AnomalyKind::OrphanResult, "99".into(), 4)],
            anomalies_dropped: 2,
            error: Some("upstream closed".to_string()),
        }
    }

    #[test]
    fn renders_sections_in_order() {
        let out = ConsoleFormatter::format(&finished());
        let text = out.find("Let me check.").unwrap();
        let search = out.find("search").unwrap();
        let fetch = out.find("fetch").unwrap();
        let done = out.find("Done.").unwrap();
        assert!(text < search && search < fetch && fetch < done);
        assert!(out.contains("3 results"));
        assert!(out.contains("404"));
    }

    #[test]
    fn renders_anomalies_and_error() {
        let out = ConsoleFormatter::format(&finished());
        assert!(out.contains("orphan_result(99) at event #4"));
        assert!(out.contains("2 more not retained"));
        assert!(out.contains("upstream closed"));
        assert!(out.contains("3 anomalies"));
    }

    #[test]
    fn only_final_snapshot_is_printed() {
        assert!(ConsoleFormatter.format_update(&finished()).is_none());
        assert!(!ConsoleFormatter.format_final(&finished()).is_empty());
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
