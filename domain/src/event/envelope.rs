//! Event envelope: the immutable unit of input to a correlation session.
//!
//! An agent process emits a single, chronologically ordered stream of
//! [`EventEnvelope`]s. Each envelope says *who* produced it ([`Origin`]) and
//! *what* happened ([`Payload`]).
//!
//! # Wire Format
//!
//! ```text
//! {"origin":"reasoner","payload":{"type":"text_chunk","content":"Let me check."}}
//! {"origin":"reasoner","payload":{"type":"invocation_request","id":"1","name":"search","arguments":{"q":"rust"}}}
//! {"origin":"world","payload":{"type":"invocation_result","id":"1","content":"ok","is_error":false}}
//! {"origin":"world","payload":{"type":"stream_error","message":"connection lost"}}
//! ```

use crate::core::error::ProtocolViolation;
use crate::invocation::entities::InvocationId;
use serde::{Deserialize, Serialize};

/// Who produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The agent's own turn (reasoning text, tool requests).
    Reasoner,
    /// Results of actions taken in response to the agent.
    World,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Reasoner => "reasoner",
            Origin::World => "world",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an event carries.
///
/// A closed sum type: every consumption site matches exhaustively, so adding
/// a new event kind is a compile-time decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    /// A fragment of natural-language reasoning.
    TextChunk { content: String },
    /// The agent asks for a tool to be invoked.
    InvocationRequest {
        id: InvocationId,
        name: String,
        #[serde(default)]
        arguments: serde_json::Value,
    },
    /// The outcome of a previously requested invocation.
    InvocationResult {
        id: InvocationId,
        #[serde(default)]
        content: serde_json::Value,
        #[serde(default)]
        is_error: bool,
    },
    /// The upstream producer failed; no further events follow.
    StreamError { message: String },
}

impl Payload {
    /// Short kind label, used in logs and transcripts.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::TextChunk { .. } => "text_chunk",
            Payload::InvocationRequest { .. } => "invocation_request",
            Payload::InvocationResult { .. } => "invocation_result",
            Payload::StreamError { .. } => "stream_error",
        }
    }

    /// The origin this payload is required to arrive with, if constrained.
    pub fn required_origin(&self) -> Option<Origin> {
        match self {
            Payload::InvocationRequest { .. } => Some(Origin::Reasoner),
            Payload::InvocationResult { .. } => Some(Origin::World),
            Payload::TextChunk { .. } | Payload::StreamError { .. } => None,
        }
    }
}

/// A single item of the event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub origin: Origin,
    pub payload: Payload,
}

impl EventEnvelope {
    pub fn new(origin: Origin, payload: Payload) -> Self {
        Self { origin, payload }
    }

    /// Reasoning text from the agent.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(
            Origin::Reasoner,
            Payload::TextChunk {
                content: content.into(),
            },
        )
    }

    /// A tool invocation request from the agent.
    pub fn request(
        id: impl Into<InvocationId>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::new(
            Origin::Reasoner,
            Payload::InvocationRequest {
                id: id.into(),
                name: name.into(),
                arguments,
            },
        )
    }

    /// A tool invocation result from the world.
    pub fn result(
        id: impl Into<InvocationId>,
        content: serde_json::Value,
        is_error: bool,
    ) -> Self {
        Self::new(
            Origin::World,
            Payload::InvocationResult {
                id: id.into(),
                content,
                is_error,
            },
        )
    }

    /// A terminal stream error.
    pub fn stream_error(message: impl Into<String>) -> Self {
        Self::new(
            Origin::World,
            Payload::StreamError {
                message: message.into(),
            },
        )
    }

    /// Check that the payload arrived with the origin the protocol requires.
    ///
    /// An `InvocationRequest` must come from the reasoner and an
    /// `InvocationResult` from the world; anything else is a structurally
    /// corrupt stream.
    pub fn validate(&self) -> Result<(), ProtocolViolation> {
        match self.payload.required_origin() {
            Some(expected) if expected != self.origin => Err(ProtocolViolation::WrongOrigin {
                kind: self.payload.kind(),
                expected,
                actual: self.origin,
            }),
            _ => Ok(()),
        }
    }
}
