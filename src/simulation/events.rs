//! Event log - the append-only chronicle shown to the player

use serde::{Deserialize, Serialize};

use crate::core::types::Tick;

/// Category of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Game,
    /// Narrative text returned by the narrator
    Ai,
    Crisis,
    Warning,
    Tech,
    War,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    pub tick: Tick,
    pub text: String,
    pub kind: LogKind,
}

/// Ordered log of everything that happened in a session
///
/// Entries are only ever appended. Trimming for storage happens on the
/// snapshot, never here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<LogEntry>,
    next_id: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from saved entries, continuing their id sequence
    pub fn from_entries(entries: Vec<LogEntry>) -> Self {
        let next_id = entries.iter().map(|e| e.id + 1).max().unwrap_or(0);
        Self { entries, next_id }
    }

    pub fn push(&mut self, kind: LogKind, tick: Tick, text: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;

        self.entries.push(LogEntry {
            id,
            tick,
            text: text.into(),
            kind,
        });

        id
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The newest `n` entries, oldest first
    pub fn recent(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Entries appended after the given id
    pub fn since(&self, id: u64) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.id > id)
    }

    pub fn of_kind(&self, kind: LogKind) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }
}
