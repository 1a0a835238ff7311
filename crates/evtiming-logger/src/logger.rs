//! Event performance logger - the event lifecycle pipeline
//!
//! Every tracked event moves through four stages:
//! 1. Start: classified, tagged and timestamped
//! 2. Processing start/end: handler timestamps stamped
//! 3. Render tick (`flush_pending`): reported now, or parked until its
//!    surface commits when a rendering update for it is still in flight
//! 4. Commit (`tree_committed`): parked events of that surface reported with
//!    the commit time as their end
//!
//! An event leaves the table only by being reported, so it is reported at
//! most once. Removal always happens under the table lock.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use evtiming_core::{
    event_type, has_pending_rendering_updates, is_target_in_root, EventTag, HighResTimeStamp,
    InteractionId, SharedEventTarget, SurfaceId, SurfaceRoot, TimingError, TimingResult,
};

use crate::{EventEntry, EventTable, LoggerConfig, PerformanceEntryReporter, ReportMode};

/// Outcome of one `flush_pending` pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlushSummary {
    /// Reported and removed
    pub reported: u32,
    /// Newly parked until their surface commits
    pub deferred: u32,
    /// Already parked, left untouched
    pub waiting_for_mount: u32,
    /// Still missing a processing timestamp
    pub processing: u32,
}

/// Tracks in-flight events and reports their timing once their effect is visible
pub struct EventPerformanceLogger {
    /// Reporter owned elsewhere; the logger is inert once it is gone
    reporter: Weak<dyn PerformanceEntryReporter>,
    /// Events in flight
    events_in_flight: Mutex<EventTable>,
    /// Last allocated tag
    last_tag: AtomicU64,
    /// Configuration
    config: LoggerConfig,
}

impl EventPerformanceLogger {
    /// Create a logger with default configuration
    pub fn new(reporter: Weak<dyn PerformanceEntryReporter>) -> Self {
        Self::with_config(reporter, LoggerConfig::default())
    }

    /// Create a logger with custom configuration
    pub fn with_config(reporter: Weak<dyn PerformanceEntryReporter>, config: LoggerConfig) -> Self {
        EventPerformanceLogger {
            reporter,
            events_in_flight: Mutex::new(EventTable::new()),
            last_tag: AtomicU64::new(0),
            config,
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Start tracking an event
    ///
    /// Returns `EventTag::EMPTY` when the event is not tracked, either because
    /// its type is not timed or because the reporter is gone.
    pub fn start(
        &self,
        raw_name: &str,
        target: SharedEventTarget,
        start_time: Option<HighResTimeStamp>,
    ) -> EventTag {
        self.try_start(raw_name, target, start_time)
            .unwrap_or(EventTag::EMPTY)
    }

    /// Start tracking an event, telling why it was not tracked
    ///
    /// `start_time` lets the host attribute the start to the platform's
    /// input timestamp; without it the reporter's clock is sampled.
    pub fn try_start(
        &self,
        raw_name: &str,
        target: SharedEventTarget,
        start_time: Option<HighResTimeStamp>,
    ) -> TimingResult<EventTag> {
        let reporter = self
            .reporter
            .upgrade()
            .ok_or(TimingError::ReporterUnavailable)?;

        let name = event_type::reported_name(raw_name)
            .ok_or_else(|| TimingError::UnsupportedEvent(raw_name.to_string()))?;

        let tag = self.next_tag();
        let start_time = start_time.unwrap_or_else(|| reporter.current_timestamp());

        let in_flight = {
            let mut events = self.events_in_flight.lock();
            events.insert(EventEntry::new(tag, name, target, start_time));
            events.len()
        };

        trace!(tag = %tag, name, ?start_time, "event started");
        if self.config.crosses_warn_threshold(in_flight) {
            warn!(
                in_flight,
                threshold = self.config.in_flight_warn_threshold,
                "event timing table is growing; events may be missing processing end"
            );
        }

        Ok(tag)
    }

    /// Stamp the moment the event's handlers started running
    pub fn processing_start(&self, tag: EventTag) {
        let Some(reporter) = self.reporter.upgrade() else {
            return;
        };

        let now = reporter.current_timestamp();
        let mut events = self.events_in_flight.lock();
        if let Some(entry) = events.get_mut(tag) {
            entry.mark_processing_start(now);
            trace!(tag = %tag, ?now, "event processing started");
        }
    }

    /// Stamp the moment the event's handlers finished
    ///
    /// Fails if processing start was never stamped; the entry is left as is.
    /// Unknown tags and a missing reporter are not errors.
    pub fn processing_end(&self, tag: EventTag) -> TimingResult<()> {
        let Some(reporter) = self.reporter.upgrade() else {
            return Ok(());
        };

        let now = reporter.current_timestamp();
        let mut events = self.events_in_flight.lock();
        let Some(entry) = events.get_mut(tag) else {
            return Ok(());
        };

        entry.mark_processing_end(now).map_err(|e| {
            error!(tag = %tag, "processing end set while processing start is not set");
            e
        })?;
        trace!(tag = %tag, ?now, "event processing ended");
        Ok(())
    }

    /// Attach the interaction this event belongs to
    ///
    /// Returns false if the event is not tracked or already has one.
    pub fn assign_interaction_id(&self, tag: EventTag, interaction_id: InteractionId) -> bool {
        if self.reporter.strong_count() == 0 {
            return false;
        }

        let mut events = self.events_in_flight.lock();
        events
            .get_mut(tag)
            .is_some_and(|entry| entry.set_interaction_id(interaction_id))
    }

    /// Report every event that is done processing and whose surface has no
    /// rendering update in flight
    ///
    /// Events whose surface is in `surfaces_with_pending_updates` are parked
    /// and reported by [`tree_committed`](Self::tree_committed) instead.
    pub fn flush_pending(&self, surfaces_with_pending_updates: &HashSet<SurfaceId>) -> FlushSummary {
        let Some(reporter) = self.reporter.upgrade() else {
            return FlushSummary::default();
        };

        let mut summary = FlushSummary::default();
        let mut events = self.events_in_flight.lock();

        let mut ready = Vec::new();
        for entry in events.iter_mut() {
            if entry.is_waiting_for_dispatch() {
                summary.processing += 1;
            } else if entry.is_waiting_for_mount() {
                summary.waiting_for_mount += 1;
            } else if has_pending_rendering_updates(entry.target(), surfaces_with_pending_updates) {
                // Reported on mount
                entry.mark_waiting_for_mount();
                summary.deferred += 1;
                trace!(tag = %entry.tag(), "event waiting for mount");
            } else {
                ready.push(entry.tag());
            }
        }

        let finished = events.take(&ready);
        summary.reported = match self.config.report_mode {
            ReportMode::UnderLock => self.report_all(&*reporter, finished, None),
            ReportMode::Deferred => {
                drop(events);
                self.report_all(&*reporter, finished, None)
            }
        };

        if summary != FlushSummary::default() {
            debug!(
                reported = summary.reported,
                deferred = summary.deferred,
                waiting_for_mount = summary.waiting_for_mount,
                processing = summary.processing,
                "flushed pending event timing entries"
            );
        }
        summary
    }

    /// Report parked events whose target belongs to the committed tree
    ///
    /// Their duration ends at `mount_time`. Events parked for other surfaces
    /// are left alone. Returns the number of events reported.
    pub fn tree_committed(&self, root: &dyn SurfaceRoot, mount_time: HighResTimeStamp) -> usize {
        let Some(reporter) = self.reporter.upgrade() else {
            return 0;
        };

        let mut events = self.events_in_flight.lock();
        let mounted: Vec<EventTag> = events
            .iter()
            .filter(|entry| entry.is_waiting_for_mount() && is_target_in_root(entry.target(), root))
            .map(|entry| entry.tag())
            .collect();

        let finished = events.take(&mounted);
        let reported = match self.config.report_mode {
            ReportMode::UnderLock => self.report_all(&*reporter, finished, Some(mount_time)),
            ReportMode::Deferred => {
                drop(events);
                self.report_all(&*reporter, finished, Some(mount_time))
            }
        };

        if reported > 0 {
            debug!(
                surface = %root.surface_id(),
                reported,
                ?mount_time,
                "reported event timing entries on mount"
            );
        }
        reported as usize
    }

    /// Number of events currently tracked
    pub fn in_flight_count(&self) -> usize {
        self.events_in_flight.lock().len()
    }

    /// Is this tag still being tracked?
    pub fn is_tracking(&self, tag: EventTag) -> bool {
        self.events_in_flight.lock().contains(tag)
    }

    /// Is this event parked until its surface commits?
    pub fn is_waiting_for_mount(&self, tag: EventTag) -> bool {
        self.events_in_flight
            .lock()
            .get(tag)
            .is_some_and(|entry| entry.is_waiting_for_mount())
    }

    /// Is the reporter still alive?
    pub fn reporter_available(&self) -> bool {
        self.reporter.strong_count() > 0
    }

    fn next_tag(&self) -> EventTag {
        EventTag::new(self.last_tag.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Hand finished entries to the reporter; `end` defaults to the reporter's now
    fn report_all(
        &self,
        reporter: &dyn PerformanceEntryReporter,
        finished: Vec<EventEntry>,
        end: Option<HighResTimeStamp>,
    ) -> u32 {
        let mut reported = 0;
        for entry in finished {
            let end = end.unwrap_or_else(|| reporter.current_timestamp());
            match entry.to_timing_entry(end) {
                Ok(timing) => {
                    debug!(
                        tag = %entry.tag(),
                        name = timing.name,
                        duration = ?timing.duration,
                        "reporting event timing entry"
                    );
                    reporter.report_event(timing);
                    reported += 1;
                }
                Err(e) => {
                    error!(tag = %entry.tag(), error = %e, "dropping event timing entry");
                    debug_assert!(false, "{e}");
                }
            }
        }
        reported
    }
}

impl std::fmt::Debug for EventPerformanceLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPerformanceLogger")
            .field("reporter_available", &self.reporter_available())
            .field("in_flight", &self.in_flight_count())
            .field("last_tag", &self.last_tag.load(Ordering::Relaxed))
            .field("config", &self.config)
            .finish()
    }
}
