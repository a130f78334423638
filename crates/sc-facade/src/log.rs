//! Ordered, append-only record of sidecar output.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl LogStream {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Stdout => "STDOUT",
            Self::Stderr => "STDERR",
        }
    }
}

/// One line of sidecar output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub stream: LogStream,
    pub text: String,
    /// Position across both streams, starting at 0.
    pub sequence: u64,
    pub received_at: DateTime<Utc>,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.stream.label(), self.text)
    }
}

/// Entries in arrival order. Retention is left to the caller.
#[derive(Debug, Default)]
pub struct LogBook {
    entries: Vec<LogEntry>,
    next_sequence: u64,
}

impl LogBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line and return the stored entry.
    pub fn append(&mut self, stream: LogStream, text: impl Into<String>) -> LogEntry {
        let entry = LogEntry {
            stream,
            text: text.into(),
            sequence: self.next_sequence,
            received_at: Utc::now(),
        };
        self.next_sequence += 1;
        self.entries.push(entry.clone());
        entry
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Entries with `sequence >= from`.
    pub fn since(&self, from: u64) -> Vec<LogEntry> {
        // Sequences are dense and start at 0, so the index is the sequence.
        let start = usize::try_from(from).unwrap_or(usize::MAX);
        self.entries.get(start..).map(<[_]>::to_vec).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
