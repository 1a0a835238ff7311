//! Event Timing Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by the event timing crates:
//! - Identifiers (EventTag, SurfaceId, InteractionId)
//! - High-resolution time primitives (HighResTimeStamp, HighResDuration)
//! - The supported event registry (raw platform name -> public event type)
//! - Event target and surface root seams used for commit correlation
//! - Error types

pub mod id;
pub mod time;
pub mod event_type;
pub mod target;
pub mod error;

pub use id::*;
pub use time::*;
pub use event_type::*;
pub use target::*;
pub use error::*;
