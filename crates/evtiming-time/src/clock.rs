//! Clock implementations for event timing

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

use evtiming_core::{HighResDuration, HighResTimeStamp};

/// Source of high-resolution timestamps
pub trait TimeSource: Send + Sync {
    fn now(&self) -> HighResTimeStamp;
}

/// Monotonic clock backed by the OS monotonic timer
/// INVARIANT: successive calls to now() never decrease
#[derive(Debug)]
pub struct MonotonicClock {
    /// Instant mapped to `origin`
    reference: Instant,
    /// Timestamp reported at `reference`
    origin: HighResTimeStamp,
}

impl MonotonicClock {
    /// Create a clock that reads zero now
    pub fn new() -> Self {
        Self::with_origin(HighResTimeStamp::ZERO)
    }

    /// Create a clock that reads `origin` now
    pub fn with_origin(origin: HighResTimeStamp) -> Self {
        MonotonicClock {
            reference: Instant::now(),
            origin,
        }
    }

    /// Time elapsed since the clock was created
    pub fn elapsed(&self) -> HighResDuration {
        self.reference.elapsed().into()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> HighResTimeStamp {
        self.origin + self.elapsed()
    }
}

/// Clock that only moves when told to
///
/// Shared between threads; every read sees the latest `set`/`advance`.
#[derive(Debug, Default)]
pub struct ManualClock {
    nanos: AtomicI64,
}

impl ManualClock {
    pub fn new(start: HighResTimeStamp) -> Self {
        ManualClock {
            nanos: AtomicI64::new(start.as_nanos()),
        }
    }

    /// Move the clock forward by `dt` and return the new time
    pub fn advance(&self, dt: HighResDuration) -> HighResTimeStamp {
        let prev = self.nanos.fetch_add(dt.as_nanos(), Ordering::SeqCst);
        HighResTimeStamp::from_nanos(prev + dt.as_nanos())
    }

    /// Jump to a specific time
    pub fn set(&self, t: HighResTimeStamp) {
        self.nanos.store(t.as_nanos(), Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> HighResTimeStamp {
        HighResTimeStamp::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}
