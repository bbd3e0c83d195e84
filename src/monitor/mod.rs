//! Process lifecycle monitoring
//!
//! - `process_table`: enumeration of the host process table
//! - `process_tracker`: diffing of successive snapshots into transitions
//! - `sink`: delivery of transitions to subscribers
//! - `polling`: the background worker that ties them together

pub mod polling;
pub mod process_table;
pub mod process_tracker;
pub mod sink;

pub use polling::ProcessMonitor;
pub use process_table::{ProcessTable, SysinfoProcessTable};
pub use process_tracker::ProcessTracker;
pub use sink::{BroadcastSink, ChannelSink, EventSink};
