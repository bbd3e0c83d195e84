//! Data models module
//!
//! Defines core data structures:
//! - ProcessRecord: identity of a process the monitor is tracking
//! - ProcessSnapshot: identifiers visible in one enumeration pass
//! - LifecycleEvent: start/termination transitions delivered to sinks
//! - ProcessLifecycleEvent: canonical serializable output form of an event
//! - MonitorError / ResolveError: error taxonomy of the monitor

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, SystemTime};

/// Host-assigned process identifier. Only unique among concurrently running
/// processes; the OS may hand the same value to a later process.
pub type ProcessId = u32;

/// A process the monitor has observed and named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    /// Process ID (PID)
    pub pid: ProcessId,
    /// Display name captured when the process was first observed
    pub name: String,
}

/// Snapshot of the process table at a given moment
#[derive(Debug, Clone)]
pub struct ProcessSnapshot {
    /// Identifiers running at capture time
    pub pids: HashSet<ProcessId>,
    /// Timestamp of this snapshot
    pub timestamp: SystemTime,
    /// Duration taken to create this snapshot
    pub scan_duration: Duration,
}

impl ProcessSnapshot {
    /// Build a snapshot stamped with the current time
    pub fn new(pids: HashSet<ProcessId>, scan_duration: Duration) -> Self {
        Self {
            pids,
            timestamp: SystemTime::now(),
            scan_duration,
        }
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }
}

impl FromIterator<ProcessId> for ProcessSnapshot {
    fn from_iter<I: IntoIterator<Item = ProcessId>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect(), Duration::ZERO)
    }
}

/// A process lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// An identifier appeared and its name was resolved
    Started { pid: ProcessId, name: String },
    /// A tracked identifier disappeared. Only the cached name is carried:
    /// the identifier means nothing to a subscriber once the process is gone.
    Terminated { name: String },
}

impl LifecycleEvent {
    pub fn name(&self) -> &str {
        match self {
            LifecycleEvent::Started { name, .. } | LifecycleEvent::Terminated { name } => name,
        }
    }

    pub fn pid(&self) -> Option<ProcessId> {
        match self {
            LifecycleEvent::Started { pid, .. } => Some(*pid),
            LifecycleEvent::Terminated { .. } => None,
        }
    }
}

/// Counters describing one completed monitoring cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub started: usize,
    pub terminated: usize,
    /// New identifiers whose name could not be resolved this cycle
    pub unresolved: usize,
    /// TrackedSet size once the cycle completed
    pub tracked: usize,
}

/// Configuration for polling behavior
#[derive(Debug, Clone)]
pub struct PollingConfiguration {
    /// Delay observed after every cycle
    pub interval: Duration,
    /// Name filters applied by the output sink
    pub name_filters: Vec<String>,
    /// Whether to output JSON format
    pub output_json: bool,
    /// Whether to run in quiet mode
    pub quiet_mode: bool,
}

impl PollingConfiguration {
    /// Build a configuration from an interval in seconds, rejecting values
    /// outside the supported range.
    pub fn with_interval_secs(seconds: f64) -> Result<Self, MonitorError> {
        Ok(Self {
            interval: validate_interval(seconds)?,
            ..Self::default()
        })
    }
}

impl Default for PollingConfiguration {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs_f64(crate::constants::DEFAULT_POLLING_INTERVAL),
            name_filters: Vec::new(),
            output_json: false,
            quiet_mode: false,
        }
    }
}

/// Convert a polling interval in seconds into a Duration, enforcing bounds
pub fn validate_interval(seconds: f64) -> Result<Duration, MonitorError> {
    use crate::constants::{POLLING_INTERVAL_MAX, POLLING_INTERVAL_MIN};

    if !seconds.is_finite() || !(POLLING_INTERVAL_MIN..=POLLING_INTERVAL_MAX).contains(&seconds) {
        return Err(MonitorError::InvalidInterval(seconds));
    }
    Ok(Duration::from_secs_f64(seconds))
}

/// Custom error types for monitoring operations
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Note: bounds must match POLLING_INTERVAL_MIN/MAX in constants.rs
    #[error("Invalid polling interval: {0}. Must be between 0.1 and 300.0 seconds")]
    InvalidInterval(f64),

    #[error("Monitor is already running")]
    AlreadyRunning,

    #[error("Monitor is not running")]
    NotRunning,

    #[error("Monitor has not been started")]
    NotStarted,

    /// The enumeration facility could not be queried at all
    #[error("Process enumeration unavailable: {0}")]
    EnumerationUnavailable(String),

    #[error("Monitor worker panicked")]
    WorkerPanicked,

    #[error("Failed to spawn monitor worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Failure to name a newly observed identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The process exited, became a zombie, or its metadata is not readable
    #[error("Process {0} not found")]
    NotFound(ProcessId),
}

/// Canonical event structure for lifecycle output.
/// Used by stdout rendering and the structured monitor logger so both share
/// one JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessLifecycleEvent {
    /// ISO 8601 timestamp of when the transition was observed
    pub timestamp: String,
    /// Event type identifier
    pub event_type: String,
    /// Process ID, present for start events only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<ProcessId>,
    /// Process name
    pub name: String,
}
