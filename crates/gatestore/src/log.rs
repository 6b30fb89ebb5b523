//! Logging sink used by gates to report failures without returning errors

use std::fmt;
use std::io;

/// Severity of a log record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Informational
    Info,
    /// Something unexpected but harmless
    Warning,
    /// An operation failed
    Error,
    /// The gate can no longer work as intended
    Critical,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
        };
        f.write_str(name)
    }
}

/// Leveled log sink with a category and an optional OS error
pub trait Logger: Send + Sync {
    /// Record one message
    fn log(&self, level: Level, category: &str, message: &str, error: Option<&io::Error>);

    /// Record an informational message
    fn info(&self, category: &str, message: &str) {
        self.log(Level::Info, category, message, None);
    }

    /// Record a warning
    fn warning(&self, category: &str, message: &str, error: Option<&io::Error>) {
        self.log(Level::Warning, category, message, error);
    }

    /// Record a failed operation
    fn error(&self, category: &str, message: &str, error: Option<&io::Error>) {
        self.log(Level::Error, category, message, error);
    }

    /// Record a critical failure
    fn critical(&self, category: &str, message: &str, error: Option<&io::Error>) {
        self.log(Level::Critical, category, message, error);
    }
}

/// Default sink forwarding every record to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, category: &str, message: &str, error: Option<&io::Error>) {
        let os_error = error.and_then(io::Error::raw_os_error);
        let rendered = error.map(|e| e.to_string());
        let detail = rendered.as_deref();
        match level {
            Level::Info => tracing::info!(category, os_error, error = detail, "{}", message),
            Level::Warning => tracing::warn!(category, os_error, error = detail, "{}", message),
            Level::Error => tracing::error!(category, os_error, error = detail, "{}", message),
            Level::Critical => {
                tracing::error!(critical = true, category, os_error, error = detail, "{}", message)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Logger that keeps every record for assertions
    #[derive(Default)]
    pub struct CaptureLogger {
        pub records: Mutex<Vec<(Level, String, String)>>,
    }

    impl CaptureLogger {
        pub fn count(&self, level: Level) -> usize {
            self.records.lock().iter().filter(|(l, _, _)| *l == level).count()
        }
    }

    impl Logger for CaptureLogger {
        fn log(&self, level: Level, category: &str, message: &str, _error: Option<&io::Error>) {
            self.records
                .lock()
                .push((level, category.to_string(), message.to_string()));
        }
    }
}
