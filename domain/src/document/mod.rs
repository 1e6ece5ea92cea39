//! Document reconstruction.
//!
//! - [`entities::Document`]: ordered, alternating text/tool sections
//! - [`builder::SectionBuilder`]: folds events into a document
//! - [`view::DocumentView`]: self-contained, serializable rendering

pub mod builder;
pub mod entities;
pub mod view;
