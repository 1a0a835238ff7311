//! Reporter seam - where finished timing entries go

use evtiming_core::{HighResDuration, HighResTimeStamp, InteractionId};

/// Finished timing entry for one event
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventTimingEntry {
    /// Public event type (`click`, `keydown`, ...)
    pub name: &'static str,
    pub start_time: HighResTimeStamp,
    /// From start until the frame showing the event's effect
    pub duration: HighResDuration,
    pub processing_start: HighResTimeStamp,
    pub processing_end: HighResTimeStamp,
    pub interaction_id: InteractionId,
}

impl EventTimingEntry {
    /// Time between the event occurring and its handlers starting
    pub fn input_delay(&self) -> HighResDuration {
        self.processing_start - self.start_time
    }

    /// Time spent running handlers
    pub fn processing_duration(&self) -> HighResDuration {
        self.processing_end - self.processing_start
    }

    /// Time between handlers finishing and the end of `duration`
    pub fn presentation_delay(&self) -> HighResDuration {
        (self.start_time + self.duration) - self.processing_end
    }
}

/// Consumer of finished timing entries, owned outside the logger
///
/// The logger only keeps a `Weak` reference. Once the reporter is dropped
/// the logger stops tracking and reporting.
pub trait PerformanceEntryReporter: Send + Sync {
    /// Current time on the clock all entries are measured against
    fn current_timestamp(&self) -> HighResTimeStamp;

    /// Take ownership of a finished entry
    ///
    /// With [`ReportMode::UnderLock`](crate::ReportMode::UnderLock) this runs
    /// while the logger's table lock is held and must not call back into the
    /// logger.
    fn report_event(&self, entry: EventTimingEntry);
}
