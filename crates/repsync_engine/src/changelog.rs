//! Append-only change log for accepted mutations.
//!
//! The reconciler records one entry per persisted mutation. The
//! recorder is best-effort from the reconciler's point of view: a
//! failure here is logged and swallowed, never rolled back against
//! the primary mutation or surfaced to the client.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use repsync_protocol::{EntityId, EntityKind, OperationType, TenantId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

/// Errors from a change-log recorder.
#[derive(Debug, Error)]
pub enum ChangeLogError {
    /// Writing the entry failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The entry could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One audit record for an accepted mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLogEntry {
    /// Kind of the mutated entity.
    pub entity_kind: EntityKind,
    /// Id of the mutated entity.
    pub entity_id: EntityId,
    /// What was done.
    pub operation: OperationType,
    /// Record snapshot after the mutation; `None` for deletes.
    pub data: Option<Value>,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// When the entry was recorded, server clock.
    pub recorded_at: DateTime<Utc>,
}

/// Sink for change-log entries.
pub trait ChangeLogRecorder: Send + Sync {
    /// Persists one entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be written. Callers
    /// treat this as non-fatal.
    fn record(&self, entry: ChangeLogEntry) -> Result<(), ChangeLogError>;
}

/// In-memory change log with live subscribers and bounded history.
///
/// Subscribers receive every recorded entry in order; the bounded
/// history supports after-the-fact inspection without a subscriber
/// having been attached at mutation time.
pub struct MemoryChangeLog {
    subscribers: RwLock<Vec<Sender<ChangeLogEntry>>>,
    history: RwLock<Vec<ChangeLogEntry>>,
    max_history: usize,
}

impl MemoryChangeLog {
    /// Creates a change log with the default history limit.
    pub fn new() -> Self {
        Self::with_max_history(10_000)
    }

    /// Creates a change log with a specific history limit.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            history: RwLock::new(Vec::new()),
            max_history,
        }
    }

    /// Subscribes to future entries.
    pub fn subscribe(&self) -> Receiver<ChangeLogEntry> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.write().push(tx);
        rx
    }

    /// Returns a copy of the retained history, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<ChangeLogEntry> {
        self.history.read().clone()
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.read().len()
    }

    /// Returns true if no entries are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.read().is_empty()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for MemoryChangeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeLogRecorder for MemoryChangeLog {
    fn record(&self, entry: ChangeLogEntry) -> Result<(), ChangeLogError> {
        {
            let mut history = self.history.write();
            history.push(entry.clone());
            if history.len() > self.max_history {
                let excess = history.len() - self.max_history;
                history.drain(0..excess);
            }
        }

        // Drop disconnected subscribers as a side effect of sending.
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| tx.send(entry.clone()).is_ok());
        Ok(())
    }
}

/// Appends entries as JSON lines to a file.
///
/// One line per entry, flushed per write, so the trail survives a
/// process crash up to the last recorded mutation.
pub struct JsonlChangeLog {
    file: Mutex<File>,
}

impl JsonlChangeLog {
    /// Opens (or creates) the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ChangeLogError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ChangeLogRecorder for JsonlChangeLog {
    fn record(&self, entry: ChangeLogEntry) -> Result<(), ChangeLogError> {
        let line = serde_json::to_string(&entry)?;
        let mut file = self.file.lock();
        writeln!(file, "{line}")?;
        file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_entry(id: &str) -> ChangeLogEntry {
        ChangeLogEntry {
            entity_kind: EntityKind::Workout,
            entity_id: EntityId::new(id),
            operation: OperationType::Create,
            data: Some(json!({"name": "Leg Day", "version": 1})),
            tenant_id: TenantId::new("t1"),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn record_and_receive() {
        let log = MemoryChangeLog::new();
        let rx = log.subscribe();

        let entry = make_entry("w1");
        log.record(entry.clone()).unwrap();

        assert_eq!(rx.recv().unwrap(), entry);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn subscriber_cleanup() {
        let log = MemoryChangeLog::new();
        let rx = log.subscribe();
        assert_eq!(log.subscriber_count(), 1);

        drop(rx);
        log.record(make_entry("w1")).unwrap();
        assert_eq!(log.subscriber_count(), 0);
    }

    #[test]
    fn history_is_bounded() {
        let log = MemoryChangeLog::with_max_history(3);
        for i in 0..5 {
            log.record(make_entry(&format!("w{i}"))).unwrap();
        }

        let entries = log.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].entity_id.as_str(), "w2");
    }

    #[test]
    fn delete_entries_have_no_data() {
        let log = MemoryChangeLog::new();
        let mut entry = make_entry("w1");
        entry.operation = OperationType::Delete;
        entry.data = None;
        log.record(entry).unwrap();

        assert!(log.entries()[0].data.is_none());
    }

    #[test]
    fn jsonl_appends_one_line_per_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.jsonl");

        let log = JsonlChangeLog::open(&path).unwrap();
        log.record(make_entry("w1")).unwrap();
        log.record(make_entry("w2")).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: ChangeLogEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.entity_id.as_str(), "w1");
    }

    #[test]
    fn jsonl_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.jsonl");

        JsonlChangeLog::open(&path)
            .unwrap()
            .record(make_entry("w1"))
            .unwrap();
        JsonlChangeLog::open(&path)
            .unwrap()
            .record(make_entry("w2"))
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
