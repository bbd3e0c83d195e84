//! Pattern matching for process name filtering
//!
//! Supports exact name matching and glob patterns, auto-detected by the
//! presence of glob characters. Filtering is applied at the sink so the
//! monitor keeps tracking every process regardless of what is displayed.

use crate::models::LifecycleEvent;
use crate::monitor::EventSink;
use anyhow::{anyhow, Result};
use glob::Pattern;

/// Check if a filter string contains glob pattern characters
pub fn is_glob_pattern(filter: &str) -> bool {
    filter.contains('*') || filter.contains('?') || filter.contains('[')
}

/// Match a process name against a filter using either exact or glob matching
pub fn matches_name_filter(name: &str, filter: &str) -> bool {
    if is_glob_pattern(filter) {
        match Pattern::new(filter) {
            Ok(pattern) => pattern.matches(name),
            // Invalid patterns fall back to exact matching
            Err(_) => name == filter,
        }
    } else {
        name == filter
    }
}

/// True if no filters are given or any filter matches `name` (logical OR)
pub fn names_match_filters(name: &str, filters: &[String]) -> bool {
    filters.is_empty() || filters.iter().any(|filter| matches_name_filter(name, filter))
}

/// Validate that all filters are syntactically correct glob patterns
pub fn validate_name_filters(filters: &[String]) -> Result<()> {
    for filter in filters {
        if is_glob_pattern(filter) {
            Pattern::new(filter)
                .map_err(|e| anyhow!("Invalid glob pattern '{}': {}", filter, e))?;
        }
    }
    Ok(())
}

/// Sink wrapper forwarding only events whose process name matches
pub struct NameFilterSink<S> {
    inner: S,
    filters: Vec<String>,
}

impl<S: EventSink> NameFilterSink<S> {
    pub fn new(inner: S, filters: Vec<String>) -> Result<Self> {
        validate_name_filters(&filters)?;
        Ok(Self { inner, filters })
    }
}

impl<S: EventSink> EventSink for NameFilterSink<S> {
    fn deliver(&self, event: &LifecycleEvent) -> Result<()> {
        if names_match_filters(event.name(), &self.filters) {
            self.inner.deliver(event)
        } else {
            Ok(())
        }
    }
}
