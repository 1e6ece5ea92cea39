//! Tool invocation tracking.
//!
//! - [`entities::InvocationRecord`]: one tool call and its eventual result
//! - [`ledger::InvocationLedger`]: correlates requests to results by id

pub mod entities;
pub mod ledger;
