use crate::models::{CycleReport, LifecycleEvent, ProcessId, ProcessRecord, ProcessSnapshot, ResolveError};
use log::debug;
use std::collections::HashMap;

/// Manages process state tracking between polling cycles.
///
/// The tracker starts empty, so the first cycle reports every process that
/// is already running as started. Subscribers should expect that burst.
#[derive(Debug, Default)]
pub struct ProcessTracker {
    tracked: HashMap<ProcessId, ProcessRecord>,
    cycles: u64,
}

impl ProcessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff `snapshot` against the tracked set and apply the result.
    ///
    /// Each new identifier gets exactly one `resolve` attempt; identifiers that
    /// fail to resolve are skipped without an event and stay untracked.
    /// Terminated events carry the name cached at start time.
    pub fn detect_transitions<F>(
        &mut self,
        snapshot: &ProcessSnapshot,
        mut resolve: F,
    ) -> (Vec<LifecycleEvent>, CycleReport)
    where
        F: FnMut(ProcessId) -> Result<String, ResolveError>,
    {
        let mut events = Vec::new();
        let mut report = CycleReport::default();

        let started: Vec<ProcessId> = snapshot
            .pids
            .iter()
            .filter(|pid| !self.tracked.contains_key(*pid))
            .copied()
            .collect();

        let terminated: Vec<ProcessId> = self
            .tracked
            .keys()
            .filter(|pid| !snapshot.pids.contains(*pid))
            .copied()
            .collect();

        for pid in started {
            match resolve(pid) {
                Ok(name) => {
                    self.tracked.insert(pid, ProcessRecord { pid, name: name.clone() });
                    events.push(LifecycleEvent::Started { pid, name });
                    report.started += 1;
                }
                Err(e) => {
                    debug!("Skipping new process {}: {}", pid, e);
                    report.unresolved += 1;
                }
            }
        }

        for pid in terminated {
            if let Some(record) = self.tracked.remove(&pid) {
                debug!("Process {} ({}) no longer running", record.pid, record.name);
                events.push(LifecycleEvent::Terminated { name: record.name });
                report.terminated += 1;
            }
        }

        self.cycles += 1;
        report.tracked = self.tracked.len();
        (events, report)
    }

    pub fn is_tracked(&self, pid: ProcessId) -> bool {
        self.tracked.contains_key(&pid)
    }

    /// Record captured when `pid` was first observed
    pub fn tracked_record(&self, pid: ProcessId) -> Option<&ProcessRecord> {
        self.tracked.get(&pid)
    }

    pub fn tracked_name(&self, pid: ProcessId) -> Option<&str> {
        self.tracked_record(pid).map(|record| record.name.as_str())
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Completed cycles since the last reset
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Forget all tracked processes; the next cycle is treated as the first
    pub fn reset(&mut self) {
        self.tracked.clear();
        self.cycles = 0;
    }
}
