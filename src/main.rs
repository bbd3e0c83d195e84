#![forbid(unsafe_code)]

mod cli;

use anyhow::Result;
use log::LevelFilter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use procwatch::constants::MONITOR_CATEGORY;
use procwatch::filter::NameFilterSink;
use procwatch::logging::{init_logger, LogLevel, MonitorLogger};
use procwatch::models::LifecycleEvent;
use procwatch::monitor::{BroadcastSink, ProcessMonitor, SysinfoProcessTable};
use procwatch::output::{create_lifecycle_event, StdoutSink};

/// How often the main thread checks for interruption or a dead worker
const SUPERVISOR_TICK: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let config = cli::parse_args()?;
    let polling = config.polling;

    let level = if config.verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    if let Err(e) = init_logger(level) {
        // Logging is optional for the tool to function
        eprintln!("Warning: {}", e);
    }
    let logger = MonitorLogger::new(MONITOR_CATEGORY, LogLevel::Info);

    // Set up interrupt handling
    let interrupted = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, interrupted.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, interrupted.clone())?;

    let table = SysinfoProcessTable::new()?;
    let transition_logger = logger.clone();
    let sink = BroadcastSink::new()
        .with(NameFilterSink::new(StdoutSink::new(polling.output_json), polling.name_filters.clone())?)
        .with(move |event: &LifecycleEvent| -> Result<()> {
            let event = create_lifecycle_event(event, std::time::SystemTime::now())?;
            transition_logger.log_transition(&event);
            Ok(())
        });

    let mut monitor = ProcessMonitor::new(table, sink, polling);
    let quiet = monitor.config().quiet_mode;
    let interval_secs = monitor.config().interval.as_secs_f64();

    if !quiet {
        eprintln!("Starting process monitoring (interval: {:.1}s)...", interval_secs);
        if !monitor.config().name_filters.is_empty() {
            eprintln!("Reporting processes named: {}", monitor.config().name_filters.join(", "));
        }
        eprintln!("Processes already running are reported as started on the first poll.");
        eprintln!("Press Ctrl+C to stop monitoring.");
        eprintln!();
    }

    monitor.start()?;
    logger.log_startup(interval_secs, std::process::id());

    while !interrupted.load(Ordering::Relaxed) && !monitor.has_exited() {
        std::thread::sleep(SUPERVISOR_TICK);
    }

    let reason = if interrupted.load(Ordering::Relaxed) {
        "Received shutdown signal"
    } else {
        "Monitoring loop ended"
    };

    let result = monitor.stop();
    if let Err(ref e) = result {
        logger.log_error(&e.to_string(), Some("monitor worker"));
    }
    logger.log_shutdown(reason);

    if !quiet {
        eprintln!("Monitoring stopped.");
    }

    Ok(result?)
}
