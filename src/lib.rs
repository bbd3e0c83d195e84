//! procwatch - process lifecycle monitoring library
//!
//! Samples the local process table on a background thread, diffs successive
//! snapshots and reports every process start and termination exactly once to
//! an `EventSink`.

pub mod config;
pub mod constants;
pub mod filter;
pub mod logging;
pub mod models;
pub mod monitor;
pub mod output;

pub use models::{LifecycleEvent, MonitorError, PollingConfiguration, ProcessId};
pub use monitor::{ChannelSink, EventSink, ProcessMonitor, ProcessTable, SysinfoProcessTable};
pub use logging::init_logger;
