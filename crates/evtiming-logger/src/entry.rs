//! In-flight event entries and the table that holds them

use std::collections::BTreeMap;
use std::fmt;

use evtiming_core::{
    EventTag, EventTarget, HighResTimeStamp, InteractionId, SharedEventTarget,
    TimingError, TimingResult,
};

use crate::EventTimingEntry;

/// How far an event has progressed through its handlers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventPhase {
    /// Started, handlers not yet running
    Dispatched,
    /// Handlers running
    Processing { start: HighResTimeStamp },
    /// Handlers finished
    Processed {
        start: HighResTimeStamp,
        end: HighResTimeStamp,
    },
}

/// One tracked event
pub struct EventEntry {
    tag: EventTag,
    name: &'static str,
    target: SharedEventTarget,
    start_time: HighResTimeStamp,
    phase: EventPhase,
    interaction_id: InteractionId,
    /// Set once the event's visual update is known to be in flight
    /// INVARIANT: never cleared while the entry is alive
    waiting_for_mount: bool,
}

impl EventEntry {
    pub fn new(
        tag: EventTag,
        name: &'static str,
        target: SharedEventTarget,
        start_time: HighResTimeStamp,
    ) -> Self {
        EventEntry {
            tag,
            name,
            target,
            start_time,
            phase: EventPhase::Dispatched,
            interaction_id: InteractionId::NONE,
            waiting_for_mount: false,
        }
    }

    pub fn tag(&self) -> EventTag {
        self.tag
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn target(&self) -> Option<&dyn EventTarget> {
        self.target.as_deref()
    }

    pub fn start_time(&self) -> HighResTimeStamp {
        self.start_time
    }

    pub fn phase(&self) -> EventPhase {
        self.phase
    }

    pub fn processing_start_time(&self) -> Option<HighResTimeStamp> {
        match self.phase {
            EventPhase::Dispatched => None,
            EventPhase::Processing { start } | EventPhase::Processed { start, .. } => Some(start),
        }
    }

    pub fn processing_end_time(&self) -> Option<HighResTimeStamp> {
        match self.phase {
            EventPhase::Processed { end, .. } => Some(end),
            _ => None,
        }
    }

    pub fn interaction_id(&self) -> InteractionId {
        self.interaction_id
    }

    pub fn is_waiting_for_mount(&self) -> bool {
        self.waiting_for_mount
    }

    /// Still missing a processing timestamp
    pub fn is_waiting_for_dispatch(&self) -> bool {
        !matches!(self.phase, EventPhase::Processed { .. })
    }

    /// Stamp processing start
    ///
    /// A repeated call replaces the earlier start; an existing end is kept.
    pub fn mark_processing_start(&mut self, t: HighResTimeStamp) {
        self.phase = match self.phase {
            EventPhase::Dispatched | EventPhase::Processing { .. } => {
                EventPhase::Processing { start: t }
            }
            EventPhase::Processed { end, .. } => EventPhase::Processed { start: t, end },
        };
    }

    /// Stamp processing end; processing start must already be set
    pub fn mark_processing_end(&mut self, t: HighResTimeStamp) -> TimingResult<()> {
        match self.phase {
            EventPhase::Dispatched => Err(TimingError::ProcessingEndBeforeStart(self.tag)),
            EventPhase::Processing { start } | EventPhase::Processed { start, .. } => {
                self.phase = EventPhase::Processed { start, end: t };
                Ok(())
            }
        }
    }

    /// Attach an interaction id if none is attached yet
    pub fn set_interaction_id(&mut self, id: InteractionId) -> bool {
        if !self.interaction_id.is_none() || id.is_none() {
            return false;
        }
        self.interaction_id = id;
        true
    }

    pub fn mark_waiting_for_mount(&mut self) {
        self.waiting_for_mount = true;
    }

    /// Build the finished entry, with `end` as the moment the effect was visible
    pub fn to_timing_entry(&self, end: HighResTimeStamp) -> TimingResult<EventTimingEntry> {
        let EventPhase::Processed {
            start: processing_start,
            end: processing_end,
        } = self.phase
        else {
            return Err(TimingError::MissingProcessingTime(self.tag));
        };

        Ok(EventTimingEntry {
            name: self.name,
            start_time: self.start_time,
            duration: end - self.start_time,
            processing_start,
            processing_end,
            interaction_id: self.interaction_id,
        })
    }
}

impl fmt::Debug for EventEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEntry")
            .field("tag", &self.tag)
            .field("name", &self.name)
            .field("surface", &self.target().map(|t| t.surface_id()))
            .field("start_time", &self.start_time)
            .field("phase", &self.phase)
            .field("interaction_id", &self.interaction_id)
            .field("waiting_for_mount", &self.waiting_for_mount)
            .finish()
    }
}

/// Events in flight, ordered by tag (and therefore by start order)
#[derive(Debug, Default)]
pub struct EventTable {
    entries: BTreeMap<EventTag, EventEntry>,
}

impl EventTable {
    pub fn new() -> Self {
        EventTable::default()
    }

    pub fn get(&self, tag: EventTag) -> Option<&EventEntry> {
        self.entries.get(&tag)
    }

    pub fn get_mut(&mut self, tag: EventTag) -> Option<&mut EventEntry> {
        self.entries.get_mut(&tag)
    }

    pub fn insert(&mut self, entry: EventEntry) {
        self.entries.insert(entry.tag, entry);
    }

    pub fn remove(&mut self, tag: EventTag) -> Option<EventEntry> {
        self.entries.remove(&tag)
    }

    pub fn contains(&self, tag: EventTag) -> bool {
        self.entries.contains_key(&tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventEntry> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EventEntry> {
        self.entries.values_mut()
    }

    /// Remove and return the given entries
    ///
    /// Tags that are no longer present are skipped.
    pub fn take(&mut self, tags: &[EventTag]) -> Vec<EventEntry> {
        tags.iter().filter_map(|tag| self.entries.remove(tag)).collect()
    }
}
