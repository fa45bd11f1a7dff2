//! Observability subsystem
//!
//! The storage engine logs through an injected [`Logger`]; it never depends
//! on a concrete backend. When the caller supplies none, a [`ConsoleLogger`]
//! at INFO is used.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use jsondb::observability::{ConsoleLogger, Logger, Severity};
//!
//! let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::new(Severity::Warn));
//! logger.debug("NOT_SHOWN", &[]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{
    format_line, ConsoleLogger, LogRecord, Logger, MemoryLogger, NullLogger, Severity,
};

/// Logs a typed event. Failure events go out at ERROR, everything else at `severity`.
pub fn log_event(logger: &dyn Logger, severity: Severity, event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_failure() {
        Severity::Error
    } else {
        severity
    };
    if logger.enabled(severity) {
        logger.log(severity, event.as_str(), fields);
    }
}
