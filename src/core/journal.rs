//! Free-text session log.
//!
//! Contexts note what happened in human terms ("room 204 selected",
//! "payment received") next to the structured transition history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One timestamped note.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Append-only list of notes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a note stamped with `at`.
    pub fn note(&mut self, at: DateTime<Utc>, message: impl Into<String>) {
        self.entries.push(JournalEntry {
            at,
            message: message.into(),
        });
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Rendered lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Whether any note contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn entries_render_with_clock_prefix() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        let mut journal = Journal::new();
        journal.note(at, "system started");

        assert_eq!(journal.lines(), vec!["[09:05:07] system started".to_string()]);
    }

    #[test]
    fn notes_keep_insertion_order() {
        let mut journal = Journal::new();
        journal.note(Utc::now(), "first");
        journal.note(Utc::now(), "second");

        let messages: Vec<_> = journal.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert!(journal.mentions("sec"));
        assert!(!journal.mentions("third"));
    }
}
