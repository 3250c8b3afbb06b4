//! Output sinks for rendered log lines.

use super::Severity;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

/// Process stream a line is written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    /// Errors and warnings go to stderr, everything else to stdout.
    pub fn for_level(level: Severity) -> Self {
        match level {
            Severity::Error | Severity::Warn => Stream::Stderr,
            Severity::Info | Severity::Debug | Severity::Verbose => Stream::Stdout,
        }
    }
}

pub trait LogSink: Send + Sync {
    /// Write one rendered record. `line` carries no trailing newline.
    fn write_line(&self, stream: Stream, line: &str);
}

/// Writes to the process stdout/stderr. Write failures are dropped.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdioSink;

impl LogSink for StdioSink {
    fn write_line(&self, stream: Stream, line: &str) {
        let _ = match stream {
            Stream::Stdout => writeln!(std::io::stdout().lock(), "{line}"),
            Stream::Stderr => writeln!(std::io::stderr().lock(), "{line}"),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedLine {
    pub stream: Stream,
    pub text: String,
}

/// In-memory sink for asserting on log output in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<CapturedLine>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<CapturedLine>> {
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn lines(&self) -> Vec<CapturedLine> {
        self.guard().clone()
    }

    /// Captured lines parsed as JSON; lines that are not JSON are skipped.
    pub fn json_records(&self) -> Vec<serde_json::Value> {
        self.guard()
            .iter()
            .filter_map(|line| serde_json::from_str(&line.text).ok())
            .collect()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, stream: Stream, line: &str) {
        self.guard().push(CapturedLine {
            stream,
            text: line.to_string(),
        });
    }
}
