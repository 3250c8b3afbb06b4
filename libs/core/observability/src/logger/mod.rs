//! Structured logger.
//!
//! Every diagnostic line in the service goes through a [`Logger`]: it drops
//! records below the configured threshold, assembles a [`LogRecord`], renders
//! it as JSON or text and routes it to stdout or stderr by severity.
//!
//! A logger is immutable. The subsystem name ("context") is bound with
//! [`Logger::with_context`], which returns a new logger, or passed per call
//! through [`LogContext::named`].

pub mod layer;
pub mod sink;

use chrono::{SecondsFormat, Utc};
use core_config::{ConfigError, FromEnv, env_parse};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use strum::{Display, EnumString};

use sink::{LogSink, StdioSink, Stream};

/// Log severity, most severe first.
///
/// The derived ordering follows declaration order, so `Error < Verbose`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Severity {
    Error,
    Warn,
    Info,
    Debug,
    Verbose,
}

impl Severity {
    /// True when a message at `self` passes a logger configured with `threshold`.
    pub fn passes(self, threshold: Severity) -> bool {
        self <= threshold
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warn => "WARN",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::Verbose => "VERBOSE",
        }
    }

    pub fn from_tracing(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => Severity::Error,
            tracing::Level::WARN => Severity::Warn,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::TRACE => Severity::Verbose,
        }
    }

    /// `EnvFilter` directive admitting the same events as this threshold.
    pub fn filter_directive(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Info => "info",
            Severity::Debug => "debug",
            Severity::Verbose => "trace",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// Logger settings, fixed at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoggerConfig {
    pub format: LogFormat,
    pub level: Severity,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            level: Severity::Info,
        }
    }
}

impl FromEnv for LoggerConfig {
    /// - LOG_FORMAT: `json` (default) or `text`
    /// - LOG_LEVEL: `error`, `warn`, `info` (default), `debug` or `verbose`
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            format: env_parse("LOG_FORMAT", "json")?,
            level: env_parse("LOG_LEVEL", "info")?,
        })
    }
}

/// Per-call context.
///
/// `name` overrides the logger's bound context for this call only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LogContext {
    pub name: Option<String>,
    pub request_id: Option<String>,
    pub correlation_id: Option<String>,
    pub user_id: Option<String>,
    pub metadata: Option<Map<String, Value>>,
}

impl LogContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn request_id(mut self, request_id: Option<impl Into<String>>) -> Self {
        self.request_id = request_id.map(Into::into);
        self
    }

    pub fn correlation_id(mut self, correlation_id: Option<impl Into<String>>) -> Self {
        self.correlation_id = correlation_id.map(Into::into);
        self
    }

    pub fn user_id(mut self, user_id: Option<impl Into<String>>) -> Self {
        self.user_id = user_id.map(Into::into);
        self
    }

    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Add one metadata entry.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

impl From<&str> for LogContext {
    fn from(name: &str) -> Self {
        LogContext::named(name)
    }
}

/// One log line, built per call and written immediately.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub timestamp: String,
    pub level: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl LogRecord {
    pub fn render(&self, format: LogFormat) -> String {
        match format {
            LogFormat::Json => self.render_json(),
            LogFormat::Text => self.render_text(),
        }
    }

    fn render_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"timestamp":"{}","level":"error","message":"unserializable log record: {}"}}"#,
                self.timestamp, e
            )
        })
    }

    /// `{timestamp} {LEVEL} [{context}][{requestId}] {message}`, with the
    /// trace on its own line for error records.
    fn render_text(&self) -> String {
        let context = self
            .context
            .as_deref()
            .map(|c| format!("[{c}]"))
            .unwrap_or_default();
        let request_id = self
            .request_id
            .as_deref()
            .map(|id| format!("[{id}]"))
            .unwrap_or_default();

        let mut line = format!(
            "{} {} {}{} {}",
            self.timestamp,
            self.level.label(),
            context,
            request_id,
            self.message
        );

        if self.level == Severity::Error {
            if let Some(trace) = &self.trace {
                line.push('\n');
                line.push_str(trace);
            }
        }

        line
    }
}

/// RFC 3339 UTC timestamp with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Clone)]
pub struct Logger {
    config: LoggerConfig,
    sink: Arc<dyn LogSink>,
    context: Option<Arc<str>>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new(config: LoggerConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            config,
            sink,
            context: None,
        }
    }

    /// Logger writing to the process stdout/stderr.
    pub fn stdio(config: LoggerConfig) -> Self {
        Self::new(config, Arc::new(StdioSink))
    }

    /// A copy of this logger bound to a subsystem name.
    pub fn with_context(&self, name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            config: self.config,
            sink: Arc::clone(&self.sink),
            context: Some(Arc::from(name)),
        }
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn enabled(&self, level: Severity) -> bool {
        level.passes(self.config.level)
    }

    pub fn log(&self, level: Severity, message: &str, trace: Option<&str>, ctx: LogContext) {
        if !self.enabled(level) {
            return;
        }

        let record = LogRecord {
            timestamp: timestamp_now(),
            level,
            message: message.to_string(),
            context: ctx.name.or_else(|| self.context.as_deref().map(str::to_string)),
            trace: trace.map(str::to_string),
            request_id: ctx.request_id,
            correlation_id: ctx.correlation_id,
            user_id: ctx.user_id,
            metadata: ctx.metadata,
        };

        self.sink
            .write_line(Stream::for_level(level), &record.render(self.config.format));
    }

    pub fn error(&self, message: &str, trace: Option<&str>, ctx: LogContext) {
        self.log(Severity::Error, message, trace, ctx);
    }

    pub fn warn(&self, message: &str, ctx: LogContext) {
        self.log(Severity::Warn, message, None, ctx);
    }

    pub fn info(&self, message: &str, ctx: LogContext) {
        self.log(Severity::Info, message, None, ctx);
    }

    pub fn debug(&self, message: &str, ctx: LogContext) {
        self.log(Severity::Debug, message, None, ctx);
    }

    pub fn verbose(&self, message: &str, ctx: LogContext) {
        self.log(Severity::Verbose, message, None, ctx);
    }
}
