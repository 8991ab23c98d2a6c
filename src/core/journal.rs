//! Event journal sinks.
//!
//! The core reports each significant event (office added/removed, letter
//! created/transferred/delivered/marked undeliverable, edge auto-created)
//! to a [`JournalSink`] as a single line of text plus structured fields.
//! Sinks do no formatting decisions beyond that line and do not route the
//! message anywhere else.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::util::clock::now_ms;

/// A single journal entry.
#[derive(Debug, Clone)]
pub struct JournalEvent {
    /// Short machine-readable event kind (`office_added`, `letter_delivered`, ...).
    pub kind: &'static str,
    /// Human-readable one-line detail.
    pub detail: String,
    /// Timestamp in milliseconds since the Unix epoch.
    pub created_at_ms: u128,
}

impl JournalEvent {
    /// Build an event stamped with the current time.
    #[must_use]
    pub fn new(kind: &'static str, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            created_at_ms: now_ms(),
        }
    }
}

/// Journal sink abstraction.
pub trait JournalSink {
    /// Record a journal event.
    fn record(&mut self, event: JournalEvent);
}

/// Shared-handle sink: lets a caller keep reading a journal it handed to
/// the mail system. The simulation is single-threaded, so `Rc<RefCell<_>>`
/// is the whole synchronization story.
impl<S: JournalSink> JournalSink for std::rc::Rc<std::cell::RefCell<S>> {
    fn record(&mut self, event: JournalEvent) {
        self.borrow_mut().record(event);
    }
}

/// In-memory journal with a bounded buffer, for tests and development.
#[derive(Debug, Default)]
pub struct InMemoryJournal {
    events: VecDeque<JournalEvent>,
    max_events: usize,
}

impl InMemoryJournal {
    /// Create a new in-memory journal keeping at most `max_events` entries.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: VecDeque::new(),
            max_events,
        }
    }

    /// Stored events, oldest first.
    #[must_use]
    pub fn events(&self) -> &VecDeque<JournalEvent> {
        &self.events
    }

    /// Number of events with the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }
}

impl JournalSink for InMemoryJournal {
    fn record(&mut self, event: JournalEvent) {
        if self.max_events > 0 && self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}

/// File-backed journal appending one timestamped line per event.
#[derive(Debug)]
pub struct FileJournal {
    writer: BufWriter<File>,
}

impl FileJournal {
    /// Open (or create) a journal file in append mode.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl JournalSink for FileJournal {
    fn record(&mut self, event: JournalEvent) {
        // A failed write is reported through tracing; the simulation never
        // fails because its journal does.
        if let Err(e) = writeln!(
            self.writer,
            "[{}] {}: {}",
            event.created_at_ms, event.kind, event.detail
        )
        .and_then(|()| self.writer.flush())
        {
            tracing::error!(error = %e, "journal write failed");
        }
    }
}
