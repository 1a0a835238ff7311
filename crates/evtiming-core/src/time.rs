//! High-resolution time primitives
//!
//! Timestamps and durations are signed nanosecond counts. Subtracting two
//! timestamps is exact: a commit that lands "before" an event start yields a
//! negative duration instead of being clamped, so reports stay faithful to
//! the values the host provided.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Point in time on the host's high-resolution clock
/// Represented as nanoseconds since the clock's origin
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HighResTimeStamp(pub i64);

impl HighResTimeStamp {
    pub const ZERO: HighResTimeStamp = HighResTimeStamp(0);

    #[inline]
    pub fn from_nanos(nanos: i64) -> Self {
        HighResTimeStamp(nanos)
    }

    #[inline]
    pub fn from_micros(micros: i64) -> Self {
        HighResTimeStamp(micros.saturating_mul(1_000))
    }

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        HighResTimeStamp(millis.saturating_mul(1_000_000))
    }

    #[inline]
    pub fn as_nanos(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl Add<HighResDuration> for HighResTimeStamp {
    type Output = HighResTimeStamp;

    #[inline]
    fn add(self, rhs: HighResDuration) -> Self::Output {
        HighResTimeStamp(self.0.saturating_add(rhs.0))
    }
}

impl Sub<HighResDuration> for HighResTimeStamp {
    type Output = HighResTimeStamp;

    #[inline]
    fn sub(self, rhs: HighResDuration) -> Self::Output {
        HighResTimeStamp(self.0.saturating_sub(rhs.0))
    }
}

impl Sub<HighResTimeStamp> for HighResTimeStamp {
    type Output = HighResDuration;

    #[inline]
    fn sub(self, rhs: HighResTimeStamp) -> Self::Output {
        HighResDuration(self.0.saturating_sub(rhs.0))
    }
}

impl std::fmt::Debug for HighResTimeStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.as_millis_f64())
    }
}

/// Signed span between two high-resolution timestamps, in nanoseconds
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HighResDuration(pub i64);

impl HighResDuration {
    pub const ZERO: HighResDuration = HighResDuration(0);

    #[inline]
    pub fn from_nanos(nanos: i64) -> Self {
        HighResDuration(nanos)
    }

    #[inline]
    pub fn from_micros(micros: i64) -> Self {
        HighResDuration(micros.saturating_mul(1_000))
    }

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        HighResDuration(millis.saturating_mul(1_000_000))
    }

    #[inline]
    pub fn as_nanos(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl From<Duration> for HighResDuration {
    fn from(d: Duration) -> Self {
        HighResDuration(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
    }
}

impl std::fmt::Debug for HighResDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}ms", self.as_millis_f64())
    }
}
