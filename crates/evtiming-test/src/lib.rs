//! Event Timing Test Harness - Simulation and validation of the timing logger
//!
//! This crate provides:
//! - A recording reporter driven by a controllable clock
//! - Seeded render pipeline simulation (events, ticks, commits)
//! - Multi-threaded stress harness for exactly-once reporting

pub mod reporter;
pub mod simulator;
pub mod concurrency;

pub use reporter::*;
pub use simulator::*;
pub use concurrency::*;
