//! Correlation session domain.
//!
//! - [`state::SessionState`]: lifecycle of one correlation run
//! - [`anomaly::Anomaly`]: non-fatal protocol inconsistencies
//! - [`snapshot::Snapshot`]: what a session emits to its consumer

pub mod anomaly;
pub mod snapshot;
pub mod state;
