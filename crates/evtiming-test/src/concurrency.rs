//! Multi-threaded stress harness
//!
//! Dispatcher threads run full event lifecycles while a render thread ticks
//! and commits concurrently. Afterwards every started event must have been
//! reported exactly once and every tag must be unique.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use evtiming_core::{CommittedRoot, EventTag, InteractionId, SurfaceId, SurfaceTarget};
use evtiming_logger::{EventPerformanceLogger, LoggerConfig, PerformanceEntryReporter};
use evtiming_time::MonotonicClock;

use crate::RecordingReporter;

/// Stress run configuration
#[derive(Clone, Debug)]
pub struct ConcurrencyConfig {
    /// Threads dispatching events
    pub dispatch_threads: usize,
    /// Events each dispatcher runs
    pub events_per_thread: usize,
    /// Number of surfaces targets are spread over
    pub surface_count: i32,
    /// Chance a surface has an update in flight on a render tick
    pub pending_update_prob: f64,
    /// Logger configuration under test
    pub logger: LoggerConfig,
    /// RNG seed for the render thread
    pub seed: u64,
}

impl Default for ConcurrencyConfig {
    fn default() -> Self {
        ConcurrencyConfig {
            dispatch_threads: 4,
            events_per_thread: 250,
            surface_count: 3,
            pending_update_prob: 0.5,
            logger: LoggerConfig::default(),
            seed: 7,
        }
    }
}

impl ConcurrencyConfig {
    pub fn with_logger(mut self, logger: LoggerConfig) -> Self {
        self.logger = logger;
        self
    }
}

/// Result of a stress run
#[derive(Clone, Debug, Default)]
pub struct ConcurrencyResult {
    /// Tags handed out
    pub started: usize,
    /// Entries received by the reporter
    pub reported: usize,
    /// Interactions reported more than once
    pub duplicates: usize,
    /// Interactions never reported
    pub missing: usize,
    /// Tags handed out more than once
    pub duplicate_tags: usize,
    /// Did every dispatcher see its own tags strictly increase?
    pub tags_increasing: bool,
    /// Events left in the logger
    pub still_in_flight: usize,
}

impl ConcurrencyResult {
    pub fn passed(&self) -> bool {
        self.duplicates == 0
            && self.missing == 0
            && self.duplicate_tags == 0
            && self.tags_increasing
            && self.still_in_flight == 0
            && self.reported == self.started
    }
}

/// Run dispatchers and a render thread against one logger
pub fn run_concurrent_pipeline(config: &ConcurrencyConfig) -> ConcurrencyResult {
    let reporter = RecordingReporter::with_clock(MonotonicClock::new());
    let logger = EventPerformanceLogger::with_config(
        RecordingReporter::downgrade(&reporter),
        config.logger.clone(),
    );
    let dispatching_done = AtomicBool::new(false);
    let all_tags: Mutex<Vec<EventTag>> = Mutex::new(Vec::new());
    let increasing = AtomicBool::new(true);

    std::thread::scope(|s| {
        let dispatchers: Vec<_> = (0..config.dispatch_threads)
            .map(|thread| {
                let logger = &logger;
                let all_tags = &all_tags;
                let increasing = &increasing;
                s.spawn(move || {
                    let mut tags = Vec::with_capacity(config.events_per_thread);
                    for i in 0..config.events_per_thread {
                        let surface = SurfaceId::new((i as i32) % config.surface_count);
                        let tag = logger.start("topClick", Some(Arc::new(SurfaceTarget(surface))), None);
                        let interaction = (thread * config.events_per_thread + i + 1) as u32;
                        logger.assign_interaction_id(tag, InteractionId::new(interaction));
                        logger.processing_start(tag);
                        let _ = logger.processing_end(tag);
                        tags.push(tag);
                    }
                    if !tags.windows(2).all(|w| w[0] < w[1]) {
                        increasing.store(false, Ordering::SeqCst);
                    }
                    all_tags.lock().extend(tags);
                })
            })
            .collect();

        let render = s.spawn(|| {
            let mut rng = StdRng::seed_from_u64(config.seed);
            let mut pending_last_tick: HashSet<SurfaceId> = HashSet::new();
            while !dispatching_done.load(Ordering::SeqCst) {
                let now = reporter.current_timestamp();
                for surface in pending_last_tick.drain() {
                    logger.tree_committed(&CommittedRoot(surface), now);
                }
                let pending: HashSet<_> = (0..config.surface_count)
                    .filter(|_| rng.gen_bool(config.pending_update_prob))
                    .map(SurfaceId::new)
                    .collect();
                logger.flush_pending(&pending);
                pending_last_tick = pending;
                std::thread::yield_now();
            }
            pending_last_tick
        });

        for d in dispatchers {
            let _ = d.join();
        }
        dispatching_done.store(true, Ordering::SeqCst);
        let leftover = render.join().unwrap_or_default();

        // Final tick: land outstanding commits, flush with nothing in flight
        let now = reporter.current_timestamp();
        for surface in leftover {
            logger.tree_committed(&CommittedRoot(surface), now);
        }
        logger.flush_pending(&HashSet::new());
    });

    let tags = all_tags.into_inner();
    let unique_tags: HashSet<_> = tags.iter().copied().collect();

    let mut counts: HashMap<InteractionId, usize> = HashMap::new();
    for entry in reporter.entries() {
        *counts.entry(entry.interaction_id).or_default() += 1;
    }
    let expected = config.dispatch_threads * config.events_per_thread;
    let missing = (1..=expected as u32)
        .filter(|i| !counts.contains_key(&InteractionId::new(*i)))
        .count();

    ConcurrencyResult {
        started: tags.len(),
        reported: reporter.len(),
        duplicates: counts.values().filter(|c| **c > 1).count(),
        missing,
        duplicate_tags: tags.len() - unique_tags.len(),
        tags_increasing: increasing.load(Ordering::SeqCst),
        still_in_flight: logger.in_flight_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{OnceLock, Weak};

    use evtiming_core::HighResTimeStamp;
    use evtiming_logger::{EventTimingEntry, ReportMode};

    #[test]
    fn test_concurrent_pipeline_deferred() {
        let result = run_concurrent_pipeline(&ConcurrencyConfig::default());
        assert!(result.passed(), "{result:?}");
        assert_eq!(result.started, 1000);
    }

    #[test]
    fn test_concurrent_pipeline_under_lock() {
        let config = ConcurrencyConfig::default()
            .with_logger(LoggerConfig::default().with_report_mode(ReportMode::UnderLock));
        let result = run_concurrent_pipeline(&config);
        assert!(result.passed(), "{result:?}");
    }

    #[test]
    fn test_concurrent_starts_get_distinct_tags() {
        let reporter = RecordingReporter::manual(HighResTimeStamp::ZERO);
        let logger = EventPerformanceLogger::new(RecordingReporter::downgrade(&reporter));

        let (a, b) = std::thread::scope(|s| {
            let a = s.spawn(|| logger.start("topClick", None, None));
            let b = s.spawn(|| logger.start("topClick", None, None));
            (a.join().unwrap(), b.join().unwrap())
        });

        assert_ne!(a, b);
        assert!(!a.is_empty() && !b.is_empty());
        assert_eq!(logger.in_flight_count(), 2);
    }

    /// Reporter that looks at the logger from inside `report_event`
    struct ReentrantReporter {
        clock: evtiming_time::ManualClock,
        logger: OnceLock<Weak<EventPerformanceLogger>>,
        seen_in_flight: Mutex<Vec<usize>>,
    }

    impl PerformanceEntryReporter for ReentrantReporter {
        fn current_timestamp(&self) -> HighResTimeStamp {
            evtiming_time::TimeSource::now(&self.clock)
        }

        fn report_event(&self, _entry: EventTimingEntry) {
            if let Some(logger) = self.logger.get().and_then(Weak::upgrade) {
                self.seen_in_flight.lock().push(logger.in_flight_count());
            }
        }
    }

    #[test]
    fn test_deferred_reporting_allows_reentry() {
        let reporter = Arc::new(ReentrantReporter {
            clock: evtiming_time::ManualClock::default(),
            logger: OnceLock::new(),
            seen_in_flight: Mutex::new(Vec::new()),
        });
        let shared: Arc<dyn PerformanceEntryReporter> = reporter.clone();
        let logger = Arc::new(EventPerformanceLogger::new(Arc::downgrade(&shared)));
        let _ = reporter.logger.set(Arc::downgrade(&logger));

        for _ in 0..2 {
            let tag = logger.start("topClick", None, None);
            logger.processing_start(tag);
            logger.processing_end(tag).unwrap();
        }
        let still_running = logger.start("topKeyDown", None, None);
        logger.processing_start(still_running);

        assert_eq!(logger.flush_pending(&HashSet::new()).reported, 2);
        // Both finished entries were already removed when reported
        assert_eq!(*reporter.seen_in_flight.lock(), vec![1, 1]);
    }
}
