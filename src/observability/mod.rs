//! Observability subsystem
//!
//! Provides:
//! - Structured logging (JSON lines on stderr)
//! - Per-store metrics counters
//! - Typed lifecycle events
//!
//! Observability is read-only: nothing here feeds back into store behavior.
//!
//! # Usage
//!
//! ```ignore
//! use prefstore::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::CommitComplete, &[("path", "/tmp/prefs.dat")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity, LOG_LEVEL_ENV};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Severity an event is logged at
pub fn event_severity(event: Event) -> Severity {
    if event.is_failure() {
        return Severity::Error;
    }
    match event {
        Event::CorruptionRecovered | Event::CommitRetry => Severity::Warn,
        Event::CommitComplete | Event::CommitSuperseded => Severity::Trace,
        _ => Severity::Info,
    }
}

/// Log a lifecycle event
pub fn log_event(event: Event) {
    Logger::log(event_severity(event), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}
