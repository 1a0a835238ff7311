//! Recording reporter for tests and simulations

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use evtiming_core::{HighResDuration, HighResTimeStamp, InteractionId};
use evtiming_logger::{EventTimingEntry, PerformanceEntryReporter};
use evtiming_time::{ManualClock, TimeSource};

/// Reporter that keeps every entry it receives
pub struct RecordingReporter<C: TimeSource = ManualClock> {
    clock: C,
    entries: Mutex<Vec<EventTimingEntry>>,
}

impl RecordingReporter<ManualClock> {
    /// Reporter on a manual clock reading `start`
    pub fn manual(start: HighResTimeStamp) -> Arc<Self> {
        Arc::new(RecordingReporter {
            clock: ManualClock::new(start),
            entries: Mutex::new(Vec::new()),
        })
    }

    /// Move the clock forward and return the new time
    pub fn advance(&self, dt: HighResDuration) -> HighResTimeStamp {
        self.clock.advance(dt)
    }
}

impl<C: TimeSource> RecordingReporter<C> {
    pub fn with_clock(clock: C) -> Arc<Self> {
        Arc::new(RecordingReporter {
            clock,
            entries: Mutex::new(Vec::new()),
        })
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Copy of everything reported so far
    pub fn entries(&self) -> Vec<EventTimingEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Entries carrying the given interaction id
    pub fn entries_for(&self, interaction_id: InteractionId) -> Vec<EventTimingEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.interaction_id == interaction_id)
            .cloned()
            .collect()
    }

    /// Remove and return everything reported so far
    pub fn drain(&self) -> Vec<EventTimingEntry> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl<C: TimeSource + 'static> RecordingReporter<C> {
    /// Weak handle suitable for an `EventPerformanceLogger`
    pub fn downgrade(this: &Arc<Self>) -> Weak<dyn PerformanceEntryReporter> {
        let shared: Arc<dyn PerformanceEntryReporter> = this.clone();
        Arc::downgrade(&shared)
    }
}

impl<C: TimeSource> PerformanceEntryReporter for RecordingReporter<C> {
    fn current_timestamp(&self) -> HighResTimeStamp {
        self.clock.now()
    }

    fn report_event(&self, entry: EventTimingEntry) {
        self.entries.lock().push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evtiming_core::{SurfaceId, SurfaceTarget};
    use evtiming_logger::EventPerformanceLogger;
    use evtiming_time::MonotonicClock;
    use std::collections::HashSet;

    #[test]
    fn test_downgrade_keeps_logger_alive() {
        let reporter = RecordingReporter::manual(HighResTimeStamp::ZERO);
        let logger = EventPerformanceLogger::new(RecordingReporter::downgrade(&reporter));

        assert!(logger.reporter_available());
        let tag = logger.start("topClick", Some(Arc::new(SurfaceTarget(SurfaceId::new(1)))), None);
        assert!(!tag.is_empty());

        drop(reporter);
        assert!(!logger.reporter_available());
    }

    #[test]
    fn test_records_with_monotonic_clock() {
        let reporter = RecordingReporter::with_clock(MonotonicClock::new());
        let logger = EventPerformanceLogger::new(RecordingReporter::downgrade(&reporter));

        let tag = logger.start("topKeyDown", None, None);
        logger.processing_start(tag);
        logger.processing_end(tag).unwrap();
        logger.flush_pending(&HashSet::new());

        let entries = reporter.drain();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].duration.is_negative());
        assert!(entries[0].processing_end >= entries[0].processing_start);
        assert!(reporter.is_empty());
    }
}
