//! Domain error types

use crate::event::envelope::Origin;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Protocol violation: {0}")]
    Protocol(#[from] ProtocolViolation),

    #[error("Document is terminal: {0}")]
    Terminal(String),
}

/// A structurally corrupt stream, as opposed to a recoverable anomaly.
///
/// Violations are fatal: the session moves to `failed`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    #[error("{kind} must arrive with origin '{expected}', got '{actual}'")]
    WrongOrigin {
        kind: &'static str,
        expected: Origin,
        actual: Origin,
    },
}
