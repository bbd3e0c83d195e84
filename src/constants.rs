//! Global constants for procwatch
//!
//! Centralized location for application-wide constants

/// Application subsystem identifier for macOS Unified Logging System
pub const APP_SUBSYSTEM: &str = "com.procwatch.monitor";

/// Logging category used for monitor session records
pub const MONITOR_CATEGORY: &str = "monitor";

/// Name given to the monitor's worker thread
pub const WORKER_THREAD_NAME: &str = "procwatch-monitor";

/// Event type identifier for a newly observed process
pub const EVENT_PROCESS_STARTED: &str = "process_started";

/// Event type identifier for a process that is no longer running
pub const EVENT_PROCESS_TERMINATED: &str = "process_terminated";

/// Default polling interval in seconds
pub const DEFAULT_POLLING_INTERVAL: f64 = 1.0;

/// Polling interval bounds in seconds.
/// Keep in sync with the message on `MonitorError::InvalidInterval`.
pub const POLLING_INTERVAL_MIN: f64 = 0.1;
pub const POLLING_INTERVAL_MAX: f64 = 300.0;

/// Config file name inside the per-user config directory
pub const CONFIG_DIR_NAME: &str = "procwatch";
pub const CONFIG_FILE_NAME: &str = "config.toml";
