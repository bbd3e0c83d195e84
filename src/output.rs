//! Output formatting module
//!
//! Handles:
//! - Building the canonical `ProcessLifecycleEvent` from a transition
//! - Human-readable and JSON line rendering
//! - `StdoutSink`, the sink used by the command-line tool

use anyhow::Result;
use std::io::Write;
use std::time::SystemTime;
use crate::constants::{EVENT_PROCESS_STARTED, EVENT_PROCESS_TERMINATED};
use crate::models::{LifecycleEvent, ProcessLifecycleEvent};
use crate::monitor::EventSink;

/// Create a ProcessLifecycleEvent from a transition observed at `observed_at`.
/// This is the canonical way to build an event for output so field names stay
/// consistent across stdout and logging.
pub fn create_lifecycle_event(event: &LifecycleEvent, observed_at: SystemTime) -> Result<ProcessLifecycleEvent> {
    use time::OffsetDateTime;

    let timestamp = OffsetDateTime::from(observed_at);
    let timestamp_str = timestamp.format(&time::format_description::well_known::Iso8601::DEFAULT)?;

    let event_type = match event {
        LifecycleEvent::Started { .. } => EVENT_PROCESS_STARTED,
        LifecycleEvent::Terminated { .. } => EVENT_PROCESS_TERMINATED,
    };

    Ok(ProcessLifecycleEvent {
        timestamp: timestamp_str,
        event_type: event_type.to_string(),
        pid: event.pid(),
        name: event.name().to_string(),
    })
}

/// Format a lifecycle event as human-readable text.
/// Only start events carry a PID, so its presence selects the wording.
pub fn format_event_human(event: &ProcessLifecycleEvent) -> String {
    match event.pid {
        Some(pid) => format!("[{}] Process started: {} (PID: {})", event.timestamp, event.name, pid),
        None => format!("[{}] Process terminated: {}", event.timestamp, event.name),
    }
}

/// Format a lifecycle event as a single JSON line
pub fn format_event_json(event: &ProcessLifecycleEvent) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

/// Prints every event on its own line to stdout
pub struct StdoutSink {
    json: bool,
}

impl StdoutSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn render(&self, event: &LifecycleEvent) -> Result<String> {
        let event = create_lifecycle_event(event, SystemTime::now())?;
        if self.json {
            format_event_json(&event)
        } else {
            Ok(format_event_human(&event))
        }
    }
}

impl EventSink for StdoutSink {
    fn deliver(&self, event: &LifecycleEvent) -> Result<()> {
        let line = self.render(event)?;
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line)?;
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at_epoch_plus(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_create_started_event() {
        let event = create_lifecycle_event(
            &LifecycleEvent::Started { pid: 100, name: "X".into() },
            at_epoch_plus(0),
        )
        .unwrap();

        assert_eq!(event.event_type, "process_started");
        assert_eq!(event.pid, Some(100));
        assert_eq!(event.name, "X");
        assert!(event.timestamp.starts_with("1970-01-01T00:00:00"), "got {}", event.timestamp);
    }

    #[test]
    fn test_create_terminated_event_has_no_pid() {
        let event = create_lifecycle_event(
            &LifecycleEvent::Terminated { name: "X".into() },
            at_epoch_plus(60),
        )
        .unwrap();

        assert_eq!(event.event_type, "process_terminated");
        assert_eq!(event.pid, None);
        assert!(event.timestamp.starts_with("1970-01-01T00:01:00"));
    }

    #[test]
    fn test_human_format() {
        let started = create_lifecycle_event(
            &LifecycleEvent::Started { pid: 42, name: "sleep".into() },
            at_epoch_plus(0),
        )
        .unwrap();
        let line = format_event_human(&started);
        assert!(line.ends_with("Process started: sleep (PID: 42)"), "got {}", line);

        let terminated = create_lifecycle_event(
            &LifecycleEvent::Terminated { name: "sleep".into() },
            at_epoch_plus(0),
        )
        .unwrap();
        let line = format_event_human(&terminated);
        assert!(line.ends_with("Process terminated: sleep"), "got {}", line);
    }

    #[test]
    fn test_json_format_schema() {
        let started = create_lifecycle_event(
            &LifecycleEvent::Started { pid: 42, name: "sleep".into() },
            at_epoch_plus(0),
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&format_event_json(&started).unwrap()).unwrap();

        assert_eq!(json["event_type"], "process_started");
        assert_eq!(json["pid"], 42);
        assert_eq!(json["name"], "sleep");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_json_terminated_omits_pid() {
        let terminated = create_lifecycle_event(
            &LifecycleEvent::Terminated { name: "sleep".into() },
            at_epoch_plus(0),
        )
        .unwrap();
        let line = format_event_json(&terminated).unwrap();

        assert!(!line.contains("\"pid\""), "pid should be omitted: {}", line);
        let parsed: ProcessLifecycleEvent = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, terminated);
    }
}
