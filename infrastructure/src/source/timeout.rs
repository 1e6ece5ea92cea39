//! Idle-timeout wrapper for event sources.
//!
//! If the wrapped source yields nothing within the idle budget, the wrapper
//! synthesizes a world-origin `StreamError` and then ends the stream. The
//! session fails through its normal stream-error path; there is no separate
//! timeout state.

use async_trait::async_trait;
use relay_application::{EventSource, SourceError};
use relay_domain::EventEnvelope;
use std::time::Duration;
use tracing::warn;

pub struct IdleTimeoutSource<S> {
    inner: S,
    idle: Duration,
    expired: bool,
}

impl<S: EventSource> IdleTimeoutSource<S> {
    pub fn new(inner: S, idle: Duration) -> Self {
        Self {
            inner,
            idle,
            expired: false,
        }
    }
}

#[async_trait]
impl<S: EventSource> EventSource for IdleTimeoutSource<S> {
    async fn next_event(&mut self) -> Option<Result<EventEnvelope, SourceError>> {
        if self.expired {
            return None;
        }
        match tokio::time::timeout(self.idle, self.inner.next_event()).await {
            Ok(next) => next,
            Err(_) => {
                self.expired = true;
                warn!(idle_ms = self.idle.as_millis() as u64, "Event source idle timeout");
                Some(Ok(EventEnvelope::stream_error(format!(
                    "idle timeout after {}",
                    format_duration(self.idle)
                ))))
            }
        }
    }
}

fn format_duration(d: Duration) -> String {
    if d.subsec_millis() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_application::ChannelEventSource;
    use relay_domain::{Origin, Payload};

    #[tokio::test]
    async fn passes_events_through_within_budget() {
        let (tx, inner) = ChannelEventSource::channel(4);
        tx.send(EventEnvelope::text("a")).await.unwrap();
        drop(tx);

        let mut source = IdleTimeoutSource::new(inner, Duration::from_secs(5));
        assert_eq!(
            source.next_event().await,
            Some(Ok(EventEnvelope::text("a")))
        );
        assert_eq!(source.next_event().await, None);
    }

    #[tokio::test]
    async fn synthesizes_stream_error_then_ends() {
        let (_tx, inner) = ChannelEventSource::channel(1);
        let mut source = IdleTimeoutSource::new(inner, Duration::from_millis(20));

        let event = source.next_event().await.unwrap().unwrap();
        assert_eq!(event.origin, Origin::World);
        assert_eq!(
            event.payload,
            Payload::StreamError {
                message: "idle timeout after 20ms".to_string()
            }
        );
        assert_eq!(source.next_event().await, None);
    }

    #[test]
    fn formats_whole_seconds() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1500ms");
    }
}
