//! Injected logging for the client.
//!
//! The client never reaches for a global logger. It is handed a `Logger`,
//! `NoopLogger` unless the caller picks otherwise, and `TracingLogger`
//! forwards events to whatever `tracing` subscriber the host installed.

use std::fmt;

use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
}

/// A structured log sink: a message plus key/value fields.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, fields: &[(&str, &dyn fmt::Display)]);

    /// Lets callers skip building expensive fields.
    fn enabled(&self, _level: LogLevel) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: LogLevel, _message: &str, _fields: &[(&str, &dyn fmt::Display)]) {}

    fn enabled(&self, _level: LogLevel) -> bool {
        false
    }
}

/// Emits `tracing` events under the `video_ai_core` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str, fields: &[(&str, &dyn fmt::Display)]) {
        let fields = Fields(fields);
        match level {
            LogLevel::Debug => debug!(target: "video_ai_core", %fields, "{message}"),
            LogLevel::Info => info!(target: "video_ai_core", %fields, "{message}"),
            LogLevel::Warn => warn!(target: "video_ai_core", %fields, "{message}"),
        }
    }

    fn enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Debug => tracing::enabled!(target: "video_ai_core", tracing::Level::DEBUG),
            LogLevel::Info => tracing::enabled!(target: "video_ai_core", tracing::Level::INFO),
            LogLevel::Warn => tracing::enabled!(target: "video_ai_core", tracing::Level::WARN),
        }
    }
}

/// `k=[v] k=[v]`
struct Fields<'a>(&'a [(&'a str, &'a dyn fmt::Display)]);

impl fmt::Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{key}=[{value}]")?;
        }
        Ok(())
    }
}
