//! Event source port
//!
//! Defines how the session controller pulls events from whatever transport
//! delivers them: an in-process channel, a JSONL file, a relayed HTTP stream.
//! The only contract is that delivery order is preserved.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use relay_domain::EventEnvelope;
use thiserror::Error;
use tokio::sync::mpsc;

/// Transport-level failures raised by an event source.
///
/// Any of these ends the session in `failed`, distinct from a clean end of
/// stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Malformed event at line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("Source disconnected: {0}")]
    Disconnected(String),
}

/// An ordered, asynchronous sequence of events.
///
/// `None` signals a clean end of stream. Events must be yielded strictly in
/// the order they were produced.
#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self) -> Option<Result<EventEnvelope, SourceError>>;
}

#[async_trait]
impl<S: EventSource + ?Sized> EventSource for Box<S> {
    async fn next_event(&mut self) -> Option<Result<EventEnvelope, SourceError>> {
        (**self).next_event().await
    }
}

/// Event source backed by an in-process `mpsc` channel.
///
/// The stream ends cleanly when every sender has been dropped.
pub struct ChannelEventSource {
    receiver: mpsc::Receiver<EventEnvelope>,
}

impl ChannelEventSource {
    pub fn new(receiver: mpsc::Receiver<EventEnvelope>) -> Self {
        Self { receiver }
    }

    /// Create a bounded channel and its source half.
    pub fn channel(capacity: usize) -> (mpsc::Sender<EventEnvelope>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl EventSource for ChannelEventSource {
    async fn next_event(&mut self) -> Option<Result<EventEnvelope, SourceError>> {
        self.receiver.recv().await.map(Ok)
    }
}

/// Event source adapter for any `futures::Stream` of events.
pub struct StreamEventSource<S> {
    stream: S,
}

impl<S> StreamEventSource<S>
where
    S: Stream<Item = Result<EventEnvelope, SourceError>> + Send + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl<S> EventSource for StreamEventSource<S>
where
    S: Stream<Item = Result<EventEnvelope, SourceError>> + Send + Unpin,
{
    async fn next_event(&mut self) -> Option<Result<EventEnvelope, SourceError>> {
        self.stream.next().await
    }
}
