//! Event Timing Example
//!
//! Walks a few UI events through dispatch, render ticks and commits and
//! prints the event timing entries that come out the other end.
//!
//! Run with `RUST_LOG=evtiming_logger=trace` to see the logger's tracing output.

use std::collections::HashSet;
use std::sync::Arc;

use evtiming_core::{
    CommittedRoot, HighResDuration, HighResTimeStamp, InteractionId, SurfaceId, SurfaceTarget,
};
use evtiming_logger::{EventPerformanceLogger, EventTimingEntry, LoggerConfig};
use evtiming_test::{PipelineSimulator, RecordingReporter, SimulationConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Event Timing Correlator ===\n");

    let reporter = RecordingReporter::manual(HighResTimeStamp::from_millis(1_000));
    let logger = EventPerformanceLogger::with_config(
        RecordingReporter::downgrade(&reporter),
        LoggerConfig::default(),
    );
    let main_surface = SurfaceId::new(1);
    let modal_surface = SurfaceId::new(2);

    // 1. Event whose surface is idle: reported on the next tick
    println!("1. Click on an idle surface");
    let click = logger.start("topClick", Some(Arc::new(SurfaceTarget(main_surface))), None);
    logger.assign_interaction_id(click, InteractionId::new(1));
    reporter.advance(HighResDuration::from_millis(4));
    logger.processing_start(click);
    reporter.advance(HighResDuration::from_millis(6));
    if let Err(e) = logger.processing_end(click) {
        println!("   processing_end failed: {e}");
    }
    reporter.advance(HighResDuration::from_millis(6));
    let summary = logger.flush_pending(&HashSet::new());
    println!("   Flush: {summary:?}");

    // 2. Event whose surface is mid-update: parked until the commit lands
    println!("\n2. Key press on a surface with an update in flight");
    let key = logger.start("topKeyDown", Some(Arc::new(SurfaceTarget(modal_surface))), None);
    logger.processing_start(key);
    reporter.advance(HighResDuration::from_millis(3));
    if let Err(e) = logger.processing_end(key) {
        println!("   processing_end failed: {e}");
    }
    let pending: HashSet<_> = [modal_surface].into_iter().collect();
    let summary = logger.flush_pending(&pending);
    println!("   Flush: {summary:?}");
    println!("   Waiting for mount: {}", logger.is_waiting_for_mount(key));

    let mount_time = reporter.advance(HighResDuration::from_millis(20));
    let reported = logger.tree_committed(&CommittedRoot(modal_surface), mount_time);
    println!("   Commit of {modal_surface} reported {reported} entr(ies)");

    // 3. Names outside the allow-list are never tracked
    println!("\n3. Unsupported event");
    let scroll = logger.start("topScroll", None, None);
    println!("   topScroll -> {scroll:?}");

    println!("\n4. Entries received by the reporter");
    for entry in reporter.entries() {
        print_entry(&entry);
    }

    // 5. Seeded pipeline run
    println!("\n5. Simulated render pipeline");
    for (label, config) in [
        ("calm", SimulationConfig::calm()),
        ("busy", SimulationConfig::busy()),
        ("leaky", SimulationConfig::leaky()),
    ] {
        let result = PipelineSimulator::new(config).run();
        println!(
            "   {label:>5}: started={} reported={} abandoned={} passed={}",
            result.started,
            result.reported,
            result.abandoned,
            result.passed()
        );
    }

    println!("\n=== Done ===");
}

fn print_entry(entry: &EventTimingEntry) {
    println!(
        "   {:<10} start={:>8.3}ms input_delay={:>6.3}ms processing={:>6.3}ms presentation={:>6.3}ms total={:>6.3}ms",
        entry.name,
        entry.start_time.as_millis_f64(),
        entry.input_delay().as_millis_f64(),
        entry.processing_duration().as_millis_f64(),
        entry.presentation_delay().as_millis_f64(),
        entry.duration.as_millis_f64(),
    );
}
