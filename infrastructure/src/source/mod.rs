//! Event source adapters
//!
//! - [`JsonlEventSource`]: newline-delimited JSON envelopes from any reader
//! - [`IdleTimeoutSource`]: turns a silent source into a stream error

mod jsonl;
mod timeout;

pub use jsonl::JsonlEventSource;
pub use timeout::IdleTimeoutSource;
