//! Append-only battle log.
//!
//! The log is the engine's only narration channel. Every line is also
//! emitted as a `tracing` debug event so binaries can stream it.

use serde::{Deserialize, Serialize};

/// One narrated event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogEntry {
    /// Round the event happened in.
    pub round: u32,
    /// Turn index within the round (0 outside of unit turns).
    pub turn: u32,
    /// Human-readable message.
    pub message: String,
}

/// Ordered list of [`LogEntry`] records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattleLog {
    entries: Vec<LogEntry>,
}

impl BattleLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, round: u32, turn: u32, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(round, turn, "{message}");
        self.entries.push(LogEntry {
            round,
            turn,
            message,
        });
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    #[must_use]
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Entries appended at or after `index`.
    #[must_use]
    pub fn since(&self, index: usize) -> &[LogEntry] {
        self.entries.get(index..).unwrap_or(&[])
    }

    /// Iterate over message text only.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }
}

/// A log handle stamped with the current round and turn.
///
/// Lets rule primitives narrate while the engine holds a mutable borrow of
/// a unit.
#[derive(Debug)]
pub struct Scribe<'a> {
    log: &'a mut BattleLog,
    round: u32,
    turn: u32,
}

impl<'a> Scribe<'a> {
    /// Wrap a log at the given position in the battle.
    pub fn new(log: &'a mut BattleLog, round: u32, turn: u32) -> Self {
        Self { log, round, turn }
    }

    /// Append a message.
    pub fn record(&mut self, message: impl Into<String>) {
        self.log.push(self.round, self.turn, message);
    }
}
