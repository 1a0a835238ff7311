//! Event Timing Time Sources
//!
//! This crate provides the clocks reporters sample timestamps from:
//! - MonotonicClock: wall-clock driven, never goes backwards
//! - ManualClock: advanced explicitly, for simulation and tests

pub mod clock;

pub use clock::*;
