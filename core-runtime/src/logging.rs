//! # Logging
//!
//! One call, [`init_logging`], installs the global `tracing` subscriber for
//! the Drive client crates. Output goes to stderr so programs can keep stdout
//! for their own results.
//!
//! Filter resolution, first match wins:
//! 1. [`LoggingConfig::with_filter`]
//! 2. `RUST_LOG`
//! 3. workspace crates at [`LoggingConfig::level`], HTTP internals at `warn`
//!
//! ```ignore
//! use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
//! use bridge_traits::LogLevel;
//!
//! init_logging(
//!     LoggingConfig::default()
//!         .with_format(LogFormat::Compact)
//!         .with_level(LogLevel::Debug)
//!         .with_logger_sink(host_sink),
//! )?;
//! ```
//!
//! A host [`LoggerSink`] receives a [`LogEntry`] per event at or above its
//! `min_level`. With redaction on (the default) token, secret and
//! authorization-code fields arrive as `[REDACTED]` and email addresses are
//! masked.

use crate::error::{Error, Result};

use bridge_traits::{LogEntry, LogLevel, LoggerSink};

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::sync::Arc;

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Crates whose events are shown at the configured level by default.
const WORKSPACE_TARGETS: &[&str] = &[
    "gdrive_client",
    "core_runtime",
    "core_auth",
    "provider_google_drive",
    "bridge_desktop",
];

/// Transport crates that are only interesting when something breaks.
const QUIET_TARGETS: &[&str] = &["h2", "hyper", "hyper_util", "reqwest", "rustls"];

const REDACTED: &str = "[REDACTED]";

/// Field-name fragments that mark a value as a credential.
const SENSITIVE_NAME_PARTS: &[&str] = &[
    "token",
    "secret",
    "password",
    "authorization",
    "bearer",
    "api_key",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-oriented
    Pretty,
    /// One JSON object per event
    Json,
    /// One line per event
    Compact,
}

impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

#[derive(Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// Level for workspace crates when no filter is given
    pub level: LogLevel,
    /// `EnvFilter` directives, e.g. `"core_auth=debug,provider_google_drive=trace"`
    pub filter: Option<String>,
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
    /// Redact sensitive fields before they reach `logger_sink`
    pub redact_pii: bool,
    /// Log span open/close (each `#[instrument]`ed operation)
    pub span_events: bool,
    pub display_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: LogLevel::Info,
            filter: None,
            logger_sink: None,
            redact_pii: true,
            span_events: false,
            display_target: true,
        }
    }
}

impl fmt::Debug for LoggingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingConfig")
            .field("format", &self.format)
            .field("level", &self.level)
            .field("filter", &self.filter)
            .field("logger_sink", &self.logger_sink.is_some())
            .field("redact_pii", &self.redact_pii)
            .field("span_events", &self.span_events)
            .finish()
    }
}

impl LoggingConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn with_pii_redaction(mut self, redact: bool) -> Self {
        self.redact_pii = redact;
        self
    }

    pub fn with_spans(mut self, enable: bool) -> Self {
        self.span_events = enable;
        self
    }

    pub fn with_target(mut self, display: bool) -> Self {
        self.display_target = display;
        self
    }
}

/// Install the global subscriber.
///
/// Fails with [`Error::Config`] on an invalid filter, or if a global
/// subscriber is already installed (including by an earlier call).
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let env_filter = std::env::var("RUST_LOG").ok();
    let filter = resolve_filter(&config, env_filter.as_deref())?;

    let sink_layer = config.logger_sink.clone().map(|sink| SinkLayer {
        sink,
        redact: config.redact_pii,
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(&config))
        .with(sink_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialized: {}", e)))
}

fn resolve_filter(config: &LoggingConfig, env_filter: Option<&str>) -> Result<EnvFilter> {
    let directives = match (&config.filter, env_filter) {
        (Some(explicit), _) => explicit.clone(),
        (None, Some(env)) if !env.trim().is_empty() => env.to_string(),
        _ => default_directives(config.level),
    };

    EnvFilter::try_new(&directives)
        .map_err(|e| Error::Config(format!("bad log filter {:?}: {}", directives, e)))
}

fn default_directives(level: LogLevel) -> String {
    WORKSPACE_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .chain(QUIET_TARGETS.iter().map(|target| format!("{}=warn", target)))
        .collect::<Vec<_>>()
        .join(",")
}

fn fmt_layer<S>(config: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let spans = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(config.display_target)
        .with_span_events(spans);

    match config.format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    }
}

/// Mirrors events into the host's [`LoggerSink`].
struct SinkLayer {
    sink: Arc<dyn LoggerSink>,
    redact: bool,
}

impl<S> Layer<S> for SinkLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = sink_level(metadata.level());
        if level < self.sink.min_level() {
            return;
        }

        let mut collector = FieldCollector::new(self.redact);
        event.record(&mut collector);

        let message = collector
            .message
            .unwrap_or_else(|| metadata.name().to_string());
        let mut entry = LogEntry::new(level, metadata.target(), message);
        entry.fields = collector.fields;
        entry.span = ctx.event_span(event).map(|span| span.name().to_string());

        deliver(Arc::clone(&self.sink), entry);
    }
}

/// Hand an entry to the sink without blocking a runtime worker.
fn deliver(sink: Arc<dyn LoggerSink>, entry: LogEntry) {
    let forward = async move {
        // Not `tracing`: that would feed back into this layer.
        if let Err(e) = sink.log(entry).await {
            eprintln!("logger sink rejected entry: {}", e);
        }
    };

    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(forward);
        }
        Err(_) => futures::executor::block_on(forward),
    }
}

fn sink_level(level: &tracing::Level) -> LogLevel {
    match *level {
        tracing::Level::ERROR => LogLevel::Error,
        tracing::Level::WARN => LogLevel::Warn,
        tracing::Level::INFO => LogLevel::Info,
        tracing::Level::DEBUG => LogLevel::Debug,
        tracing::Level::TRACE => LogLevel::Trace,
    }
}

struct FieldCollector {
    redact: bool,
    message: Option<String>,
    fields: BTreeMap<String, String>,
}

impl FieldCollector {
    fn new(redact: bool) -> Self {
        Self {
            redact,
            message: None,
            fields: BTreeMap::new(),
        }
    }

    fn insert(&mut self, field: &Field, value: String) {
        let name = field.name();
        if name == "message" {
            self.message = Some(value);
            return;
        }

        let value = if self.redact {
            redact_if_sensitive(name, &value)
        } else {
            value
        };
        self.fields.insert(name.to_string(), value);
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, format!("{:?}", value));
    }
}

/// Redact a field value when its name marks it as sensitive.
///
/// Names containing `token`, `secret`, `password`, `authorization`, `bearer`
/// or `api_key` are replaced entirely, as is a field named exactly `code`
/// (an OAuth authorization code; `status_code` is left alone). Values that
/// look like an email address keep only their first character.
///
/// ```
/// use core_runtime::logging::redact_if_sensitive;
///
/// assert_eq!(redact_if_sensitive("refresh_token", "1//0g"), "[REDACTED]");
/// assert_eq!(redact_if_sensitive("file_id", "1Zx9"), "1Zx9");
/// ```
pub fn redact_if_sensitive(field_name: &str, value: &str) -> String {
    let name = field_name.to_ascii_lowercase();
    if name == "code" || SENSITIVE_NAME_PARTS.iter().any(|part| name.contains(part)) {
        return REDACTED.to_string();
    }

    mask_email(value).unwrap_or_else(|| value.to_string())
}

fn mask_email(value: &str) -> Option<String> {
    let (local, domain) = value.split_once('@')?;
    if !domain.contains('.') || value.contains(char::is_whitespace) {
        return None;
    }
    let first = local.chars().next()?;
    Some(format!("{}***@{}", first, REDACTED))
}
