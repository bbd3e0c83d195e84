//! Process table access
//!
//! `ProcessTable` is the seam between the monitor and the host's process
//! enumeration facility. `SysinfoProcessTable` is the production
//! implementation backed by the `sysinfo` crate.

use crate::models::{MonitorError, ProcessId, ProcessSnapshot, ResolveError};
use std::time::Instant;
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, ThreadKind};

/// Enumeration facility used by the monitor.
///
/// Implementations must omit identifiers they cannot see rather than fail:
/// `snapshot` errors are reserved for a facility that cannot be queried at
/// all, and the monitor treats them as fatal.
pub trait ProcessTable: Send {
    /// Every identifier currently visible to the caller
    fn snapshot(&mut self) -> Result<ProcessSnapshot, MonitorError>;

    /// Best-effort display name lookup. The process may have exited since
    /// the last snapshot, in which case `ResolveError::NotFound` is returned.
    fn resolve_name(&mut self, pid: ProcessId) -> Result<String, ResolveError>;
}

/// Process table backed by `sysinfo`
pub struct SysinfoProcessTable {
    system: System,
}

impl SysinfoProcessTable {
    /// Create a process table, failing if `sysinfo` cannot enumerate
    /// processes on this platform.
    pub fn new() -> Result<Self, MonitorError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(MonitorError::EnumerationUnavailable(format!(
                "process enumeration is not supported on {}",
                std::env::consts::OS
            )));
        }

        Ok(Self {
            system: System::new(),
        })
    }
}

impl ProcessTable for SysinfoProcessTable {
    fn snapshot(&mut self) -> Result<ProcessSnapshot, MonitorError> {
        let scan_start = Instant::now();

        // Only the process list is needed; skip CPU, memory, exe, cmd, etc.
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::new(),
        );

        let pids = self
            .system
            .processes()
            .iter()
            .filter(|(_, process)| !is_user_thread(process))
            .map(|(pid, _)| pid.as_u32())
            .collect();
        let snapshot = ProcessSnapshot::new(pids, scan_start.elapsed());

        // The monitor itself is always running, so an empty table means the
        // facility did not answer.
        if snapshot.is_empty() {
            return Err(MonitorError::EnumerationUnavailable(
                "process table returned no entries".to_string(),
            ));
        }

        Ok(snapshot)
    }

    fn resolve_name(&mut self, pid: ProcessId) -> Result<String, ResolveError> {
        let sys_pid = Pid::from_u32(pid);

        // Re-query this one process so an exit since the snapshot is noticed
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sys_pid]),
            true,
            ProcessRefreshKind::new(),
        );

        let process = self
            .system
            .process(sys_pid)
            .ok_or(ResolveError::NotFound(pid))?;

        if is_user_thread(process)
            || matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead)
        {
            return Err(ResolveError::NotFound(pid));
        }

        let name = process.name().to_string_lossy().to_string();
        if name.is_empty() {
            return Err(ResolveError::NotFound(pid));
        }

        Ok(name)
    }
}

/// On Linux sysinfo also lists every task of a process. Kernel threads are
/// real table entries and stay; userland threads are not processes.
fn is_user_thread(process: &Process) -> bool {
    matches!(process.thread_kind(), Some(ThreadKind::Userland))
}
