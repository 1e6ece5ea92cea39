//! JSONL event source.
//!
//! Reads one [`EventEnvelope`] per line from any async buffered reader: a
//! file, stdin, a socket, or the body of a long-poll HTTP response. Blank
//! lines are skipped. A line that does not parse is a transport-level error;
//! EOF is a clean end of stream.

use async_trait::async_trait;
use relay_application::{EventSource, SourceError};
use relay_domain::EventEnvelope;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::trace;

pub struct JsonlEventSource<R> {
    lines: Lines<R>,
    line_no: u64,
}

impl<R> JsonlEventSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl JsonlEventSource<BufReader<File>> {
    /// Open a JSONL file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path)
            .await
            .map_err(|e| SourceError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl JsonlEventSource<BufReader<Stdin>> {
    /// Read events from standard input.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R> EventSource for JsonlEventSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_event(&mut self) -> Option<Result<EventEnvelope, SourceError>> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => return Some(Err(SourceError::Io(e.to_string()))),
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            trace!(line = self.line_no, "Read event line");
            return Some(
                serde_json::from_str(trimmed).map_err(|e| SourceError::Malformed {
                    line: self.line_no,
                    message: e.to_string(),
                }),
            );
        }
    }
}
