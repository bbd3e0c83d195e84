//! Logging setup and structured monitor logging
//!
//! Library code logs through the `log` facade. `init_logger` installs the
//! platform backend: macOS Unified Logging via `oslog`, `env_logger` (stderr,
//! honouring `RUST_LOG`) elsewhere.

use anyhow::Result;
use log::{error, info, LevelFilter};
use serde_json::json;
use crate::models::ProcessLifecycleEvent;

/// Install the global logger. Fails if a logger is already installed.
pub fn init_logger(level: LevelFilter) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        oslog::OsLogger::new(crate::constants::APP_SUBSYSTEM)
            .level_filter(level)
            .init()
            .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;
    }

    #[cfg(not(target_os = "macos"))]
    {
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;
    }

    Ok(())
}

/// Levels understood by `MonitorLogger`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Info,
}

/// Structured session logger: each record carries a JSON payload after the
/// human-readable message.
#[derive(Debug, Clone)]
pub struct MonitorLogger {
    category: String,
    level: LogLevel,
}

impl MonitorLogger {
    pub fn new(category: impl Into<String>, level: LogLevel) -> Self {
        Self {
            category: category.into(),
            level,
        }
    }

    /// Log monitor startup
    pub fn log_startup(&self, interval_secs: f64, pid: u32) {
        let message = json!({
            "event": "monitor_startup",
            "category": self.category,
            "pid": pid,
            "poll_interval": interval_secs,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Info, "Monitor started", &message);
    }

    /// Log monitor shutdown
    pub fn log_shutdown(&self, reason: &str) {
        let message = json!({
            "event": "monitor_shutdown",
            "category": self.category,
            "reason": reason,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Info, "Monitor shutting down", &message);
    }

    /// Log a lifecycle transition
    pub fn log_transition(&self, event: &ProcessLifecycleEvent) {
        let message = json!({
            "event": event.event_type,
            "category": self.category,
            "pid": event.pid,
            "process_name": event.name,
            "timestamp": event.timestamp,
        });

        self.log_structured(
            LogLevel::Info,
            &format!("{}: {}", event.event_type, event.name),
            &message,
        );
    }

    /// Log error events
    pub fn log_error(&self, error_message: &str, context: Option<&str>) {
        let message = json!({
            "event": "error",
            "category": self.category,
            "message": error_message,
            "context": context,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Error, error_message, &message);
    }

    /// Render the record without emitting it
    pub fn format_record(message: &str, data: &serde_json::Value) -> String {
        format!("{} | {}", message, data)
    }

    fn log_structured(&self, level: LogLevel, message: &str, data: &serde_json::Value) {
        if !self.should_log(level) {
            return;
        }

        let full_message = Self::format_record(message, data);
        match level {
            LogLevel::Error => error!("{}", full_message),
            LogLevel::Info => info!("{}", full_message),
        }
    }

    fn should_log(&self, level: LogLevel) -> bool {
        match (self.level, level) {
            (_, LogLevel::Error) => true,
            (LogLevel::Info, LogLevel::Info) => true,
            (LogLevel::Error, LogLevel::Info) => false,
        }
    }
}
