//! End-to-end scenarios for the event timing logger

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use proptest::prelude::*;

use evtiming_core::{
    supported_raw_names, CommittedRoot, EventTag, HighResDuration, HighResTimeStamp,
    InteractionId, SharedEventTarget, SurfaceId, SurfaceTarget, TimingError,
};
use evtiming_logger::{EventPerformanceLogger, FlushSummary};
use evtiming_test::RecordingReporter;

fn setup() -> (Arc<RecordingReporter>, EventPerformanceLogger) {
    let reporter = RecordingReporter::manual(HighResTimeStamp::from_millis(500));
    let logger = EventPerformanceLogger::new(RecordingReporter::downgrade(&reporter));
    (reporter, logger)
}

fn on_surface(surface: i32) -> SharedEventTarget {
    Some(Arc::new(SurfaceTarget(SurfaceId::new(surface))))
}

#[test]
fn click_reported_on_next_tick() {
    let (reporter, logger) = setup();

    let tag = logger.start("topClick", on_surface(1), None);
    assert_eq!(tag, EventTag::new(1));
    logger.processing_start(tag);
    logger.processing_end(tag).unwrap();

    let now = reporter.advance(HighResDuration::from_millis(12));
    logger.flush_pending(&HashSet::new());

    let entries = reporter.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "click");
    assert_eq!(entries[0].duration, now - HighResTimeStamp::from_millis(500));
    assert_eq!(logger.in_flight_count(), 0);
}

#[test]
fn click_on_updating_surface_reported_on_mount() {
    let (reporter, logger) = setup();
    let surface = SurfaceId::new(2);

    let _first = logger.start("topClick", on_surface(1), None);
    let tag = logger.start("topClick", on_surface(2), None);
    assert_eq!(tag, EventTag::new(2));
    logger.processing_start(tag);
    logger.processing_end(tag).unwrap();

    let pending: HashSet<_> = [surface].into_iter().collect();
    let summary = logger.flush_pending(&pending);
    assert_eq!(summary.deferred, 1);
    assert!(logger.is_waiting_for_mount(tag));
    assert!(reporter.is_empty());

    let mount_time = reporter.advance(HighResDuration::from_millis(33));
    reporter.advance(HighResDuration::from_millis(5));
    assert_eq!(logger.tree_committed(&CommittedRoot(surface), mount_time), 1);

    let entries = reporter.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].duration, HighResDuration::from_millis(33));
    assert!(!logger.is_tracking(tag));
}

#[test]
fn unsupported_event_leaves_table_unchanged() {
    let (_reporter, logger) = setup();
    logger.start("topClick", on_surface(1), None);

    assert_eq!(logger.start("unsupportedEvent", on_surface(1), None), EventTag::EMPTY);
    assert_eq!(logger.in_flight_count(), 1);
}

#[test]
fn every_supported_event_is_tracked() {
    let (_reporter, logger) = setup();
    for raw in supported_raw_names() {
        assert!(!logger.start(raw, None, None).is_empty(), "{raw}");
    }
    assert_eq!(logger.in_flight_count(), supported_raw_names().count());
}

#[test]
fn commit_only_reports_its_own_surface() {
    let (reporter, logger) = setup();

    let tags: Vec<_> = (0..3)
        .map(|surface| {
            let tag = logger.start("topKeyPress", on_surface(surface), None);
            logger.processing_start(tag);
            logger.processing_end(tag).unwrap();
            tag
        })
        .collect();

    let pending: HashSet<_> = (0..3).map(SurfaceId::new).collect();
    logger.flush_pending(&pending);

    let mount_time = reporter.advance(HighResDuration::from_millis(16));
    assert_eq!(logger.tree_committed(&CommittedRoot(SurfaceId::new(1)), mount_time), 1);
    assert!(logger.is_waiting_for_mount(tags[0]));
    assert!(!logger.is_tracking(tags[1]));
    assert!(logger.is_waiting_for_mount(tags[2]));
}

#[test]
fn dead_reporter_turns_everything_into_noops() {
    let (reporter, logger) = setup();
    let tag = logger.start("topClick", on_surface(1), None);
    logger.processing_start(tag);
    logger.processing_end(tag).unwrap();
    drop(reporter);

    assert_eq!(
        logger.try_start("topClick", on_surface(1), None),
        Err(TimingError::ReporterUnavailable)
    );
    assert_eq!(logger.start("topClick", on_surface(1), None), EventTag::EMPTY);
    assert_eq!(logger.flush_pending(&HashSet::new()), FlushSummary::default());
    assert_eq!(
        logger.tree_committed(&CommittedRoot(SurfaceId::new(1)), HighResTimeStamp::ZERO),
        0
    );
    // Nothing reported, so the record stays put
    assert!(logger.is_tracking(tag));
}

#[derive(Clone, Debug)]
enum Op {
    Start { surface: i32, supported: bool },
    ProcessingStart(usize),
    ProcessingEnd(usize),
    Flush(u8),
    Commit(i32),
    Advance(i64),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3i32, any::<bool>()).prop_map(|(surface, supported)| Op::Start { surface, supported }),
        (0..32usize).prop_map(Op::ProcessingStart),
        (0..32usize).prop_map(Op::ProcessingEnd),
        (0..8u8).prop_map(Op::Flush),
        (0..3i32).prop_map(Op::Commit),
        (1..50i64).prop_map(Op::Advance),
    ]
}

proptest! {
    #[test]
    fn reports_at_most_once_and_never_while_pending(ops in prop::collection::vec(op(), 1..120)) {
        let (reporter, logger) = setup();
        let mut started: Vec<(EventTag, SurfaceId)> = Vec::new();
        let mut last_tag = EventTag::EMPTY;

        for op in ops {
            match op {
                Op::Start { surface, supported } => {
                    let name = if supported { "topClick" } else { "topScroll" };
                    let tag = logger.start(name, on_surface(surface), None);
                    if supported {
                        prop_assert!(tag > last_tag);
                        last_tag = tag;
                        let interaction = InteractionId::new(tag.as_u64() as u32);
                        prop_assert!(logger.assign_interaction_id(tag, interaction));
                        started.push((tag, SurfaceId::new(surface)));
                    } else {
                        prop_assert!(tag.is_empty());
                    }
                }
                Op::ProcessingStart(i) => {
                    if let Some((tag, _)) = started.get(i) {
                        logger.processing_start(*tag);
                    }
                }
                Op::ProcessingEnd(i) => {
                    if let Some((tag, _)) = started.get(i) {
                        let _ = logger.processing_end(*tag);
                    }
                }
                Op::Flush(mask) => {
                    let pending: HashSet<_> = (0..3)
                        .filter(|s| mask & (1 << s) != 0)
                        .map(SurfaceId::new)
                        .collect();
                    let before: HashSet<_> = started
                        .iter()
                        .filter(|(tag, surface)| logger.is_tracking(*tag) && pending.contains(surface))
                        .map(|(tag, _)| *tag)
                        .collect();
                    logger.flush_pending(&pending);
                    for tag in before {
                        prop_assert!(logger.is_tracking(tag), "{tag:?} reported while pending");
                    }
                }
                Op::Commit(surface) => {
                    let now = reporter.advance(HighResDuration::ZERO);
                    logger.tree_committed(&CommittedRoot(SurfaceId::new(surface)), now);
                }
                Op::Advance(ms) => {
                    reporter.advance(HighResDuration::from_millis(ms));
                }
            }
        }

        let mut counts: HashMap<InteractionId, usize> = HashMap::new();
        for entry in reporter.entries() {
            prop_assert!(entry.processing_start >= entry.start_time);
            *counts.entry(entry.interaction_id).or_default() += 1;
        }
        prop_assert!(counts.values().all(|c| *c == 1));
        prop_assert_eq!(counts.len() + logger.in_flight_count(), started.len());
    }
}
