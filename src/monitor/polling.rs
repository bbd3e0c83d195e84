//! Background polling worker and its control surface

use crate::constants::WORKER_THREAD_NAME;
use crate::models::{CycleReport, MonitorError, PollingConfiguration, ProcessId};
use crate::monitor::{EventSink, ProcessTable, ProcessTracker};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

type WorkerResult = (Box<dyn ProcessTable>, Result<(), MonitorError>);

/// Watches the process table on a dedicated thread and reports process
/// start and termination to an `EventSink`.
///
/// The first cycle after every `start()` reports all processes that are
/// already running as started; there is no earlier baseline to compare with.
pub struct ProcessMonitor {
    config: PollingConfiguration,
    table: Option<Box<dyn ProcessTable>>,
    sink: Arc<dyn EventSink>,
    tracker: Arc<Mutex<ProcessTracker>>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<WorkerResult>>,
    started_once: bool,
}

impl ProcessMonitor {
    pub fn new<T, S>(table: T, sink: S, config: PollingConfiguration) -> Self
    where
        T: ProcessTable + 'static,
        S: EventSink + 'static,
    {
        Self {
            config,
            table: Some(Box::new(table)),
            sink: Arc::new(sink),
            tracker: Arc::new(Mutex::new(ProcessTracker::new())),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
            started_once: false,
        }
    }

    pub fn config(&self) -> &PollingConfiguration {
        &self.config
    }

    /// Spawn the worker and begin cycling. Each start is a fresh session:
    /// previously tracked processes are forgotten.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        if self.worker.is_some() {
            return Err(MonitorError::AlreadyRunning);
        }
        // Only missing if a previous worker panicked and took it down
        let table = self.table.take().ok_or(MonitorError::WorkerPanicked)?;

        lock_tracker(&self.tracker).reset();
        self.running.store(true, Ordering::SeqCst);

        let worker = Worker {
            table,
            sink: self.sink.clone(),
            tracker: self.tracker.clone(),
            running: self.running.clone(),
            interval: self.config.interval,
        };

        let handle = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || worker.run());

        match handle {
            Ok(handle) => {
                self.worker = Some(handle);
                self.started_once = true;
                Ok(())
            }
            Err(e) => {
                // The closure owning the table was dropped with the failed spawn
                self.running.store(false, Ordering::SeqCst);
                Err(MonitorError::Spawn(e))
            }
        }
    }

    /// Request cancellation and wait for the worker to exit. No events are
    /// delivered after this returns. If the worker had already stopped on a
    /// fatal error, that error is returned here.
    pub fn stop(&mut self) -> Result<(), MonitorError> {
        let handle = self.worker.take().ok_or(MonitorError::NotRunning)?;

        self.running.store(false, Ordering::SeqCst);
        handle.thread().unpark();

        match handle.join() {
            Ok((table, result)) => {
                self.table = Some(table);
                result
            }
            Err(_) => Err(MonitorError::WorkerPanicked),
        }
    }

    /// Whether a worker is active and still cycling
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Whether the worker ended on its own (fatal enumeration error or
    /// panic). Call `stop()` to collect the error.
    pub fn has_exited(&self) -> bool {
        self.worker
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(false)
    }

    /// Whether `pid` was running and tracked as of the last completed cycle
    pub fn is_tracked(&self, pid: ProcessId) -> Result<bool, MonitorError> {
        Ok(self.read_tracker()?.is_tracked(pid))
    }

    /// Cached name of a tracked process
    pub fn tracked_name(&self, pid: ProcessId) -> Result<Option<String>, MonitorError> {
        Ok(self.read_tracker()?.tracked_name(pid).map(str::to_string))
    }

    pub fn tracked_count(&self) -> Result<usize, MonitorError> {
        Ok(self.read_tracker()?.tracked_count())
    }

    /// Completed cycles in the current (or last) session
    pub fn cycles(&self) -> Result<u64, MonitorError> {
        Ok(self.read_tracker()?.cycles())
    }

    fn read_tracker(&self) -> Result<MutexGuard<'_, ProcessTracker>, MonitorError> {
        if !self.started_once {
            return Err(MonitorError::NotStarted);
        }
        Ok(lock_tracker(&self.tracker))
    }
}

impl Drop for ProcessMonitor {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.stop() {
                warn!("Monitor stopped with error: {}", e);
            }
        }
    }
}

/// A tracker is never left half-updated by a panic inside a cycle, so a
/// poisoned lock is still safe to use.
fn lock_tracker(tracker: &Mutex<ProcessTracker>) -> MutexGuard<'_, ProcessTracker> {
    tracker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// State moved onto the worker thread
struct Worker {
    table: Box<dyn ProcessTable>,
    sink: Arc<dyn EventSink>,
    tracker: Arc<Mutex<ProcessTracker>>,
    running: Arc<AtomicBool>,
    interval: Duration,
}

impl Worker {
    fn run(mut self) -> WorkerResult {
        info!(
            "Process monitor started (interval: {:.1}s)",
            self.interval.as_secs_f64()
        );

        let result = self.run_loop();
        if let Err(ref e) = result {
            error!("Process monitor stopped: {}", e);
        } else {
            info!("Process monitor stopped");
        }

        self.running.store(false, Ordering::SeqCst);
        (self.table, result)
    }

    fn run_loop(&mut self) -> Result<(), MonitorError> {
        while self.running.load(Ordering::SeqCst) {
            let report = self.run_cycle()?;
            debug!(
                "Cycle complete: {} started, {} terminated, {} unresolved, {} tracked",
                report.started, report.terminated, report.unresolved, report.tracked
            );

            self.sleep_interval();
        }
        Ok(())
    }

    /// One snapshot-diff-emit pass
    fn run_cycle(&mut self) -> Result<CycleReport, MonitorError> {
        let snapshot = self.table.snapshot()?;
        debug!(
            "Snapshot: {} processes in {:?}",
            snapshot.len(),
            snapshot.scan_duration
        );

        let table = &mut self.table;
        let (events, report) = {
            let mut tracker = lock_tracker(&self.tracker);
            tracker.detect_transitions(&snapshot, |pid| table.resolve_name(pid))
        };

        // Delivered outside the lock so sinks may query the monitor
        for event in &events {
            if let Err(e) = self.sink.deliver(event) {
                warn!("Failed to deliver {:?}: {}", event, e);
            }
        }

        Ok(report)
    }

    /// Sleep for the full interval, waking early if cancellation is requested
    fn sleep_interval(&self) {
        let deadline = Instant::now() + self.interval;
        while self.running.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::park_timeout(deadline - now);
        }
    }
}
