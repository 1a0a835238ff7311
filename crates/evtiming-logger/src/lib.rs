//! Event Timing Logger - Event lifecycle tracking and commit correlation
//!
//! This crate implements the event timing logger:
//! - Supported event filtering and tag allocation
//! - Processing start/end stamping
//! - Deferral of events whose surface still has a rendering update in flight
//! - Finalization on the render tick or on the matching tree commit
//! - Exactly-once hand-off of finished entries to a weakly held reporter

pub mod config;
pub mod entry;
pub mod logger;
pub mod reporter;

pub use config::*;
pub use entry::*;
pub use logger::*;
pub use reporter::*;
