//! Session Controller
//!
//! Drives one correlation run end-to-end: pulls events from an
//! [`EventSource`], folds them through a [`SectionBuilder`], and emits a
//! [`Snapshot`] on every visible change.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──start──> Running ──source ends──────────────> Completed
//!                        ├──cancel──────────────────> Cancelled
//!                        └──stream/transport error──> Failed
//! ```
//!
//! Waiting for the next event races against the cancellation token with a
//! `biased` select, so a cancellation is observed at the next opportunity
//! even when events are already buffered.
//!
//! Every terminal path emits one final snapshot carrying the finalized
//! document. Partial progress is never discarded.

use crate::config::SessionConfig;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::event_source::EventSource;
use crate::ports::snapshot_notifier::{ChannelNotifier, SnapshotNotifier};
use relay_domain::{
    Anomaly, AnomalyLog, EventEnvelope, Fold, Payload, SectionBuilder, SessionState, Snapshot,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Caller misuse and task-level failures, reported synchronously.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session already started (state: {0})")]
    AlreadyRunning(SessionState),

    #[error("Session task failed: {0}")]
    TaskFailed(String),
}

/// Owns the lifecycle of exactly one correlation run.
///
/// A controller can be started once; a second `start` or `run` fails with
/// [`SessionError::AlreadyRunning`]. Independent sessions need independent
/// controllers, which share no mutable state.
pub struct SessionController {
    config: SessionConfig,
    cancellation: CancellationToken,
    state: watch::Sender<SessionState>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl SessionController {
    pub fn new(config: SessionConfig) -> Self {
        let (state, _) = watch::channel(SessionState::Idle);
        Self {
            config,
            cancellation: CancellationToken::new(),
            state,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Set the transcript logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Request cancellation.
    ///
    /// Idempotent; cancelling a terminal session does nothing. Cancelling an
    /// idle controller makes the eventual run end immediately as `Cancelled`.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Start consuming `source` on a background task.
    ///
    /// Snapshots are delivered through the returned handle's channel; the
    /// final snapshot is also returned by [`SessionHandle::join`].
    pub fn start<S>(&self, source: S) -> Result<SessionHandle, SessionError>
    where
        S: EventSource + 'static,
    {
        self.begin()?;

        let (tx, rx) = mpsc::unbounded_channel();
        let run = self.session_run();
        let cancellation = self.cancellation.clone();
        let task = tokio::spawn(async move {
            let mut source = source;
            let notifier = ChannelNotifier::new(tx);
            run.drive(&mut source, &cancellation, &notifier).await
        });

        Ok(SessionHandle {
            snapshots: rx,
            cancellation: self.cancellation.clone(),
            state: self.state.subscribe(),
            task: Some(task),
        })
    }

    /// Consume `source` on the current task and return the final snapshot.
    pub async fn run<S>(
        &self,
        source: &mut S,
        notifier: &dyn SnapshotNotifier,
    ) -> Result<Snapshot, SessionError>
    where
        S: EventSource + ?Sized,
    {
        self.begin()?;
        Ok(self
            .session_run()
            .drive(source, &self.cancellation, notifier)
            .await)
    }

    /// `Idle -> Running`, atomically.
    fn begin(&self) -> Result<(), SessionError> {
        let mut current = SessionState::Idle;
        let started = self.state.send_if_modified(|state| {
            current = *state;
            if state.can_transition_to(SessionState::Running) {
                *state = SessionState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(SessionError::AlreadyRunning(current));
        }
        info!("Correlation session started");
        self.conversation_logger.log(ConversationEvent::new(
            "session_started",
            serde_json::json!({}),
        ));
        Ok(())
    }

    fn session_run(&self) -> SessionRun {
        let anomalies = match self.config.max_anomalies {
            Some(cap) => AnomalyLog::with_capacity_limit(cap),
            None => AnomalyLog::new(),
        };
        SessionRun {
            builder: SectionBuilder::new(),
            anomalies,
            sequence: 0,
            event_index: 0,
            emit_unchanged: self.config.emit_unchanged,
            state: self.state.clone(),
            conversation_logger: self.conversation_logger.clone(),
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Handle to a session started with [`SessionController::start`].
///
/// Dropping the handle without joining cancels the session.
pub struct SessionHandle {
    /// Snapshots in emission order; closes after the final snapshot.
    pub snapshots: mpsc::UnboundedReceiver<Snapshot>,
    cancellation: CancellationToken,
    state: watch::Receiver<SessionState>,
    task: Option<JoinHandle<Snapshot>>,
}

impl SessionHandle {
    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Receive the next snapshot, or `None` once the session has finished
    /// and every snapshot has been delivered.
    pub async fn next_snapshot(&mut self) -> Option<Snapshot> {
        self.snapshots.recv().await
    }

    /// Wait for the session to finish and return its final snapshot.
    pub async fn join(mut self) -> Result<Snapshot, SessionError> {
        let task = self
            .task
            .take()
            .ok_or_else(|| SessionError::TaskFailed("session already joined".to_string()))?;
        task.await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.cancellation.cancel();
        }
    }
}

/// Mutable state of one run. Lives on the single consuming path only.
struct SessionRun {
    builder: SectionBuilder,
    anomalies: AnomalyLog,
    sequence: u64,
    event_index: u64,
    emit_unchanged: bool,
    state: watch::Sender<SessionState>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl SessionRun {
    async fn drive<S>(
        mut self,
        source: &mut S,
        cancellation: &CancellationToken,
        notifier: &dyn SnapshotNotifier,
    ) -> Snapshot
    where
        S: EventSource + ?Sized,
    {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    info!(events = self.event_index, "Session cancelled");
                    return self.finish(SessionState::Cancelled, None, notifier);
                }
                next = source.next_event() => next,
            };

            let event = match next {
                None => return self.finish(SessionState::Completed, None, notifier),
                Some(Err(e)) => {
                    warn!("Event source failed: {}", e);
                    return self.finish(SessionState::Failed, Some(e.to_string()), notifier);
                }
                Some(Ok(event)) => event,
            };

            self.event_index += 1;
            if let Some(message) = self.apply(&event, notifier) {
                return self.finish(SessionState::Failed, Some(message), notifier);
            }
        }
    }

    /// Apply one event. Returns the fatal error message, if any.
    fn apply(&mut self, event: &EventEnvelope, notifier: &dyn SnapshotNotifier) -> Option<String> {
        let fold = match self.builder.apply(event) {
            Ok(fold) => fold,
            Err(e) => {
                warn!(event = self.event_index, "Fatal protocol error: {}", e);
                return Some(e.to_string());
            }
        };

        debug!(
            event = self.event_index,
            kind = event.payload.kind(),
            origin = %event.origin,
            "Applied event: {:?}",
            fold
        );

        match fold {
            Fold::Changed(_) => {
                self.log_invocation(event);
                self.emit_running(notifier);
            }
            Fold::Unchanged => {
                if self.emit_unchanged {
                    self.emit_running(notifier);
                }
            }
            Fold::Anomaly { kind, id } => {
                let anomaly = Anomaly::new(kind, id, self.event_index);
                warn!("Protocol anomaly: {}", anomaly);
                self.conversation_logger.log(ConversationEvent::new(
                    "anomaly",
                    serde_json::json!({
                        "kind": anomaly.kind,
                        "id": anomaly.id,
                        "event_index": anomaly.event_index,
                    }),
                ));
                self.anomalies.push(anomaly);
                self.emit_running(notifier);
            }
            Fold::Terminated { message } => {
                warn!(event = self.event_index, "Stream error: {}", message);
                return Some(message);
            }
        }
        None
    }

    fn log_invocation(&self, event: &EventEnvelope) {
        match &event.payload {
            Payload::InvocationRequest { id, name, .. } => {
                self.conversation_logger.log(ConversationEvent::new(
                    "invocation_requested",
                    serde_json::json!({
                        "id": id,
                        "name": name,
                        "event_index": self.event_index,
                    }),
                ));
            }
            Payload::InvocationResult { id, is_error, .. } => {
                self.conversation_logger.log(ConversationEvent::new(
                    "invocation_completed",
                    serde_json::json!({
                        "id": id,
                        "is_error": is_error,
                        "event_index": self.event_index,
                    }),
                ));
            }
            Payload::TextChunk { .. } | Payload::StreamError { .. } => {}
        }
    }

    fn emit_running(&mut self, notifier: &dyn SnapshotNotifier) {
        let snapshot = self.snapshot(SessionState::Running, None);
        notifier.on_snapshot(&snapshot);
    }

    fn finish(
        mut self,
        state: SessionState,
        error: Option<String>,
        notifier: &dyn SnapshotNotifier,
    ) -> Snapshot {
        let previous = self.state.send_replace(state);
        debug_assert!(
            previous.can_transition_to(state),
            "illegal session transition {} -> {}",
            previous,
            state
        );
        let snapshot = self.snapshot(state, error);

        info!(
            state = %state,
            events = self.event_index,
            sections = snapshot.document.len(),
            anomalies = snapshot.anomalies.len(),
            "Correlation session finished"
        );
        self.conversation_logger.log(ConversationEvent::new(
            "session_finished",
            serde_json::json!({
                "state": state,
                "events": self.event_index,
                "sections": snapshot.document.len(),
                "anomalies": snapshot.anomalies.len(),
                "error": snapshot.error,
            }),
        ));

        notifier.on_snapshot(&snapshot);
        snapshot
    }

    fn snapshot(&mut self, state: SessionState, error: Option<String>) -> Snapshot {
        self.sequence += 1;
        let document = if state.is_terminal() {
            self.builder.finalized_view()
        } else {
            self.builder.view()
        };
        Snapshot {
            sequence: self.sequence,
            state,
            document,
            anomalies: self.anomalies.entries().to_vec(),
            anomalies_dropped: self.anomalies.dropped(),
            error,
        }
    }
}
