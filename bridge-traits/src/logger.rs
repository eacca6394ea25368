//! Host log forwarding.
//!
//! The core logs through `tracing`. Hosts that want those events in their
//! own pipeline (OSLog, Logcat, a file) implement [`LoggerSink`] and hand it
//! to `core_runtime::logging`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Lowercase name, as used in `EnvFilter` directives.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One event as delivered to a [`LoggerSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub timestamp: DateTime<Utc>,
    /// Module path of the emitting code, e.g. `core_auth::manager`
    pub target: String,
    pub message: String,
    /// Structured fields, already redacted if redaction is on
    pub fields: BTreeMap<String, String>,
    /// Name of the innermost active span (usually the operation)
    pub span: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Utc::now(),
            target: target.into(),
            message: message.into(),
            fields: BTreeMap::new(),
            span: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Receiver for core log events.
///
/// Entries arrive after redaction; implementations should still avoid
/// persisting anything they would not want in a crash report.
///
/// ```ignore
/// struct OsLogSink;
///
/// #[async_trait]
/// impl LoggerSink for OsLogSink {
///     async fn log(&self, entry: LogEntry) -> Result<()> {
///         os_log(entry.level, &entry.target, &entry.message);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait LoggerSink: Send + Sync {
    async fn log(&self, entry: LogEntry) -> Result<()>;

    /// Events below this level are dropped before an entry is built.
    fn min_level(&self) -> LogLevel {
        LogLevel::Info
    }
}
