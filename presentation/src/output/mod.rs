//! Snapshot formatters: console, JSON lines, and Server-Sent Events.

pub mod console;
pub mod formatter;
pub mod json;
pub mod sse;
