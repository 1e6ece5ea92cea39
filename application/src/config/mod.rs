//! Application-level configuration.
//!
//! - [`SessionConfig`]: anomaly retention, snapshot emission, idle budget

pub mod session_config;

pub use session_config::SessionConfig;
