//! Input events.

pub mod envelope;
