//! Render pipeline simulator for the event timing logger
//!
//! Simulates:
//! - Events dispatched to several surfaces, frame by frame
//! - Handlers that start and finish over later frames (or never finish)
//! - Surfaces with rendering updates in flight during a tick
//! - Commits landing one frame after the update was scheduled
//!
//! Every reported entry is checked against what the pipeline actually did.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use evtiming_core::{
    supported_raw_names, CommittedRoot, EventTag, HighResDuration, HighResTimeStamp,
    InteractionId, SurfaceId, SurfaceTarget,
};
use evtiming_logger::{EventPerformanceLogger, LoggerConfig, PerformanceEntryReporter};

use crate::RecordingReporter;

/// Pipeline simulation configuration
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    /// Number of surfaces
    pub surface_count: i32,
    /// Frames to simulate
    pub frames: u32,
    /// Upper bound of events started per frame
    pub max_events_per_frame: u32,
    /// Time between ticks
    pub frame_interval: HighResDuration,
    /// Chance a surface has a rendering update in flight on a tick
    pub pending_update_prob: f64,
    /// Chance an event's handlers never finish
    pub abandon_prob: f64,
    /// Chance an event is of a type that is not timed
    pub unsupported_prob: f64,
    /// Chance the host supplies the platform input time
    pub explicit_start_prob: f64,
    /// Logger configuration under test
    pub logger: LoggerConfig,
    /// RNG seed
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            surface_count: 3,
            frames: 120,
            max_events_per_frame: 4,
            frame_interval: HighResDuration::from_micros(16_667),
            pending_update_prob: 0.3,
            abandon_prob: 0.0,
            unsupported_prob: 0.1,
            explicit_start_prob: 0.3,
            logger: LoggerConfig::default(),
            seed: 42,
        }
    }
}

impl SimulationConfig {
    /// No rendering updates ever in flight: everything reports on the tick
    pub fn calm() -> Self {
        SimulationConfig {
            pending_update_prob: 0.0,
            ..Self::default()
        }
    }

    /// Most ticks have updates in flight
    pub fn busy() -> Self {
        SimulationConfig {
            surface_count: 5,
            max_events_per_frame: 8,
            pending_update_prob: 0.8,
            ..Self::default()
        }
    }

    /// Some handlers never finish
    pub fn leaky() -> Self {
        SimulationConfig {
            abandon_prob: 0.2,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_logger(mut self, logger: LoggerConfig) -> Self {
        self.logger = logger;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Dispatched,
    Processing,
    Processed,
    Abandoned,
    Finished,
}

#[derive(Clone, Debug)]
struct SimEvent {
    tag: EventTag,
    surface: SurfaceId,
    start_time: HighResTimeStamp,
    stage: Stage,
    parked: bool,
    /// When the logger should have ended the event's duration
    expected_end: Option<HighResTimeStamp>,
}

/// Result of a simulation run
#[derive(Clone, Debug, Default)]
pub struct SimulationResult {
    /// Events the logger accepted
    pub started: u32,
    /// Events the logger refused to track
    pub untracked: u32,
    /// Entries the reporter received
    pub reported: u32,
    /// Events parked until their surface committed
    pub deferred: u32,
    /// Events whose handlers never finished
    pub abandoned: u32,
    /// Events left in the logger at the end
    pub still_in_flight: usize,
    /// Everything that went against expectations
    pub violations: Vec<String>,
}

impl SimulationResult {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Drives an `EventPerformanceLogger` through a simulated render pipeline
pub struct PipelineSimulator {
    config: SimulationConfig,
    reporter: Arc<RecordingReporter>,
    logger: EventPerformanceLogger,
    rng: StdRng,
    events: HashMap<InteractionId, SimEvent>,
    pending_last_frame: HashSet<SurfaceId>,
    next_interaction: u32,
    result: SimulationResult,
}

impl PipelineSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        let reporter = RecordingReporter::manual(HighResTimeStamp::from_millis(1_000));
        let logger = EventPerformanceLogger::with_config(
            RecordingReporter::downgrade(&reporter),
            config.logger.clone(),
        );
        let rng = StdRng::seed_from_u64(config.seed);

        PipelineSimulator {
            config,
            reporter,
            logger,
            rng,
            events: HashMap::new(),
            pending_last_frame: HashSet::new(),
            next_interaction: 1,
            result: SimulationResult::default(),
        }
    }

    pub fn logger(&self) -> &EventPerformanceLogger {
        &self.logger
    }

    pub fn reporter(&self) -> &Arc<RecordingReporter> {
        &self.reporter
    }

    /// Run all frames, let outstanding commits land, then validate
    pub fn run(mut self) -> SimulationResult {
        for _ in 0..self.config.frames {
            self.frame(true);
        }
        // Updates scheduled on the last frame commit here; nothing new starts
        self.frame(false);
        self.frame(false);

        self.validate()
    }

    /// One frame: commits, new events, handler progress, tick
    fn frame(&mut self, dispatch: bool) {
        let now = self.reporter.advance(self.config.frame_interval);

        self.commit_pending_surfaces(now);
        if dispatch {
            self.dispatch_events(now);
        }
        self.progress_handlers();

        let pending = if dispatch {
            self.pick_pending_surfaces()
        } else {
            HashSet::new()
        };
        self.tick(&pending);
        self.pending_last_frame = pending;
    }

    fn commit_pending_surfaces(&mut self, mount_time: HighResTimeStamp) {
        let mut surfaces: Vec<_> = self.pending_last_frame.drain().collect();
        surfaces.sort();

        for surface in surfaces {
            for event in self.events.values_mut() {
                if event.parked && event.surface == surface && event.expected_end.is_none() {
                    event.expected_end = Some(mount_time);
                }
            }
            let reported = self.logger.tree_committed(&CommittedRoot(surface), mount_time);
            debug!(surface = %surface, reported, "simulated commit");
        }
    }

    fn dispatch_events(&mut self, now: HighResTimeStamp) {
        let names: Vec<&'static str> = supported_raw_names().collect();
        let count = self.rng.gen_range(0..=self.config.max_events_per_frame);

        for _ in 0..count {
            let surface = SurfaceId::new(self.rng.gen_range(0..self.config.surface_count));
            let name = if self.rng.gen_bool(self.config.unsupported_prob) {
                "topScroll"
            } else {
                names.choose(&mut self.rng).copied().unwrap_or("topClick")
            };
            let explicit = if self.rng.gen_bool(self.config.explicit_start_prob) {
                let lag = HighResDuration::from_micros(self.rng.gen_range(0..4_000));
                Some(now - lag)
            } else {
                None
            };

            let tag = self
                .logger
                .start(name, Some(Arc::new(SurfaceTarget(surface))), explicit);
            if tag.is_empty() {
                self.result.untracked += 1;
                continue;
            }
            self.result.started += 1;

            let interaction = InteractionId::new(self.next_interaction);
            self.next_interaction += 1;
            self.logger.assign_interaction_id(tag, interaction);

            self.events.insert(
                interaction,
                SimEvent {
                    tag,
                    surface,
                    start_time: explicit.unwrap_or(now),
                    stage: Stage::Dispatched,
                    parked: false,
                    expected_end: None,
                },
            );
        }
    }

    fn progress_handlers(&mut self) {
        let mut interactions: Vec<_> = self.events.keys().copied().collect();
        interactions.sort_by_key(|i| i.0);

        for interaction in interactions {
            let abandon = self.rng.gen_bool(self.config.abandon_prob);
            let step = HighResDuration::from_micros(self.rng.gen_range(100..2_000));
            let Some(event) = self.events.get_mut(&interaction) else {
                continue;
            };

            match event.stage {
                Stage::Dispatched => {
                    self.reporter.advance(step);
                    self.logger.processing_start(event.tag);
                    event.stage = Stage::Processing;
                }
                Stage::Processing if abandon => {
                    event.stage = Stage::Abandoned;
                    self.result.abandoned += 1;
                }
                Stage::Processing => {
                    self.reporter.advance(step);
                    if let Err(e) = self.logger.processing_end(event.tag) {
                        self.result
                            .violations
                            .push(format!("{interaction:?}: unexpected error {e}"));
                    }
                    event.stage = Stage::Processed;
                }
                _ => {}
            }
        }
    }

    fn pick_pending_surfaces(&mut self) -> HashSet<SurfaceId> {
        (0..self.config.surface_count)
            .filter(|_| self.rng.gen_bool(self.config.pending_update_prob))
            .map(SurfaceId::new)
            .collect()
    }

    fn tick(&mut self, pending: &HashSet<SurfaceId>) {
        let now = self.reporter.current_timestamp();
        let summary = self.logger.flush_pending(pending);
        self.result.deferred += summary.deferred;

        for (interaction, event) in self.events.iter_mut() {
            if event.stage != Stage::Processed {
                continue;
            }
            if !self.logger.is_tracking(event.tag) {
                if !event.parked {
                    if pending.contains(&event.surface) {
                        self.result.violations.push(format!(
                            "{interaction:?}: reported while {} had an update in flight",
                            event.surface
                        ));
                    }
                    event.expected_end = Some(now);
                }
                event.stage = Stage::Finished;
            } else if self.logger.is_waiting_for_mount(event.tag) {
                event.parked = true;
            } else {
                self.result
                    .violations
                    .push(format!("{interaction:?}: processed but neither reported nor parked"));
            }
        }
    }

    fn validate(mut self) -> SimulationResult {
        let entries = self.reporter.entries();
        self.result.reported = entries.len() as u32;
        self.result.still_in_flight = self.logger.in_flight_count();

        let mut seen: HashSet<InteractionId> = HashSet::new();
        for entry in &entries {
            let interaction = entry.interaction_id;
            if !seen.insert(interaction) {
                self.result
                    .violations
                    .push(format!("{interaction:?}: reported more than once"));
                continue;
            }
            let Some(event) = self.events.get(&interaction) else {
                self.result
                    .violations
                    .push(format!("{interaction:?}: reported but never started"));
                continue;
            };

            if entry.start_time != event.start_time {
                self.result.violations.push(format!(
                    "{interaction:?}: start {:?} != {:?}",
                    entry.start_time, event.start_time
                ));
            }
            if entry.processing_end < entry.processing_start {
                self.result
                    .violations
                    .push(format!("{interaction:?}: processing ends before it starts"));
            }
            match event.expected_end {
                Some(end) if entry.duration == end - event.start_time => {}
                expected => self.result.violations.push(format!(
                    "{interaction:?}: duration {:?}, expected end {:?}",
                    entry.duration, expected
                )),
            }
        }

        for (interaction, event) in &self.events {
            let should_report = matches!(event.stage, Stage::Processed | Stage::Finished);
            if should_report && !seen.contains(interaction) {
                self.result
                    .violations
                    .push(format!("{interaction:?}: processed but never reported"));
            }
        }

        if self.result.still_in_flight != self.result.abandoned as usize {
            self.result.violations.push(format!(
                "{} events in flight, {} abandoned",
                self.result.still_in_flight, self.result.abandoned
            ));
        }

        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evtiming_logger::ReportMode;

    #[test]
    fn test_default_simulation() {
        let result = PipelineSimulator::new(SimulationConfig::default()).run();
        assert!(result.passed(), "{:?}", result.violations);
        assert!(result.started > 0);
        assert_eq!(result.reported, result.started);
    }

    #[test]
    fn test_calm_simulation_never_defers() {
        let result = PipelineSimulator::new(SimulationConfig::calm()).run();
        assert!(result.passed(), "{:?}", result.violations);
        assert_eq!(result.deferred, 0);
    }

    #[test]
    fn test_busy_simulation_defers() {
        let result = PipelineSimulator::new(SimulationConfig::busy()).run();
        assert!(result.passed(), "{:?}", result.violations);
        assert!(result.deferred > 0);
    }

    #[test]
    fn test_leaky_simulation_keeps_abandoned_events() {
        let result = PipelineSimulator::new(SimulationConfig::leaky()).run();
        assert!(result.passed(), "{:?}", result.violations);
        assert!(result.abandoned > 0);
        assert_eq!(result.still_in_flight, result.abandoned as usize);
        assert_eq!(result.reported + result.abandoned, result.started);
    }

    #[test]
    fn test_under_lock_reporting() {
        let config = SimulationConfig::busy()
            .with_logger(LoggerConfig::default().with_report_mode(ReportMode::UnderLock));
        let result = PipelineSimulator::new(config).run();
        assert!(result.passed(), "{:?}", result.violations);
    }

    #[test]
    fn test_many_seeds() {
        for seed in 0..20 {
            let result = PipelineSimulator::new(SimulationConfig::default().with_seed(seed)).run();
            assert!(result.passed(), "seed {seed}: {:?}", result.violations);
        }
    }
}
