//! Invocation ledger: the single source of truth correlating tool requests
//! to their results.
//!
//! The ledger is session-scoped: records are created on first sight of an id,
//! never removed, and dropped together with the session. It emits nothing on
//! its own; callers inspect the returned outcomes and decide what to report.

use super::entities::{InvocationId, InvocationRecord};
use std::collections::HashMap;

/// Outcome of [`InvocationLedger::record_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A fresh record was created.
    Created,
    /// A record with this id already existed and was left untouched.
    ///
    /// Transports may re-deliver requests, so this is not an error.
    Existing,
}

/// Outcome of [`InvocationLedger::record_result`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOutcome {
    /// The record moved from `Pending` to a terminal status.
    Applied,
    /// The record was already terminal; the result was ignored.
    DuplicateIgnored,
    /// No request with this id has been seen.
    Orphan,
}

/// Session-scoped store of invocation records, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InvocationLedger {
    records: HashMap<InvocationId, InvocationRecord>,
}

impl InvocationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a tool request.
    ///
    /// Idempotent: if `id` is already known the existing record is returned
    /// unchanged together with [`RequestOutcome::Existing`]. Callers must not
    /// assume a fresh record was created.
    pub fn record_request(
        &mut self,
        id: &InvocationId,
        name: &str,
        arguments: &serde_json::Value,
    ) -> (RequestOutcome, &InvocationRecord) {
        let outcome = if self.records.contains_key(id) {
            RequestOutcome::Existing
        } else {
            self.records.insert(
                id.clone(),
                InvocationRecord::new(id.clone(), name, arguments.clone()),
            );
            RequestOutcome::Created
        };
        (outcome, &self.records[id])
    }

    /// Record a tool result against its request.
    pub fn record_result(
        &mut self,
        id: &InvocationId,
        content: &serde_json::Value,
        is_error: bool,
    ) -> ResultOutcome {
        match self.records.get_mut(id) {
            None => ResultOutcome::Orphan,
            Some(record) => {
                if record.complete(content.clone(), is_error) {
                    ResultOutcome::Applied
                } else {
                    ResultOutcome::DuplicateIgnored
                }
            }
        }
    }

    pub fn get(&self, id: &InvocationId) -> Option<&InvocationRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
