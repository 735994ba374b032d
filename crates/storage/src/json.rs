//! JSON-file history journal.
//!
//! One file holds the append-only journal for every ticket. Writes go to a
//! temporary file first and are renamed into place, so a crash mid-write
//! never leaves a truncated journal. Single-writer-per-ticket semantics are
//! the caller's responsibility; `append_versioned` offers an optimistic
//! version check for deployments where two processes might race.

use std::fs;
use std::path::{Path, PathBuf};

use benchline_core::{
    HistoryEntry, HistoryError, HistoryLog, NewHistoryEntry, TicketStatus,
};
use time::OffsetDateTime;

use crate::error::StorageError;
use crate::record::HistoryRecord;

/// File-backed history log.
#[derive(Debug)]
pub struct JsonHistory {
    path: PathBuf,
    records: Vec<HistoryRecord>,
}

impl JsonHistory {
    /// Open a journal file, creating an empty journal if the file does not
    /// exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let records = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            Vec::new()
        };
        Ok(JsonHistory { path, records })
    }

    /// Number of entries recorded for a ticket. This is the version callers
    /// pass to `append_versioned`.
    pub fn version(&self, ticket_id: &str) -> usize {
        self.records
            .iter()
            .filter(|r| r.ticket_id == ticket_id)
            .count()
    }

    /// Append with an optimistic version check: fails with
    /// `ConcurrentConflict` when the ticket's history has grown since the
    /// caller read `expected_version`.
    pub fn append_versioned(
        &mut self,
        entry: NewHistoryEntry,
        expected_version: usize,
    ) -> Result<HistoryEntry, StorageError> {
        let actual = self.version(&entry.ticket_id);
        if actual != expected_version {
            return Err(StorageError::ConcurrentConflict {
                ticket_id: entry.ticket_id,
                expected_version,
            });
        }
        self.append_unchecked(entry)
    }

    fn append_unchecked(&mut self, entry: NewHistoryEntry) -> Result<HistoryEntry, StorageError> {
        let id = self.records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let entry = HistoryEntry {
            id,
            ticket_id: entry.ticket_id,
            status: entry.status,
            notes: entry.notes,
            actor: entry.actor,
            created_at: OffsetDateTime::now_utc(),
        };
        self.records.push(HistoryRecord::from_entry(&entry)?);
        match self.persist() {
            Ok(()) => Ok(entry),
            Err(e) => {
                // Keep the in-memory journal consistent with the file.
                self.records.pop();
                Err(e)
            }
        }
    }

    fn persist(&self) -> Result<(), StorageError> {
        let tmp = tmp_path(&self.path);
        fs::write(&tmp, serde_json::to_vec_pretty(&self.records)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

impl HistoryLog for JsonHistory {
    fn append(&mut self, entry: NewHistoryEntry) -> Result<HistoryEntry, HistoryError> {
        Ok(self.append_unchecked(entry)?)
    }

    fn entries(&self, ticket_id: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        self.records
            .iter()
            .filter(|r| r.ticket_id == ticket_id)
            .map(|r| r.to_entry().map_err(HistoryError::from))
            .collect()
    }

    fn current_status(&self, ticket_id: &str) -> Result<Option<TicketStatus>, HistoryError> {
        self.records
            .iter()
            .rev()
            .find(|r| r.ticket_id == ticket_id)
            .map(|r| r.to_entry().map(|e| e.status).map_err(HistoryError::from))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchline_core::Role;
    use tempfile::tempdir;

    fn new_entry(ticket_id: &str, status: TicketStatus) -> NewHistoryEntry {
        NewHistoryEntry {
            ticket_id: ticket_id.to_string(),
            status,
            notes: None,
            actor: Role::Staff,
        }
    }

    #[test]
    fn journal_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");

        {
            let mut log = JsonHistory::open(&path).unwrap();
            log.append(new_entry("TK-1", TicketStatus::Received)).unwrap();
            log.append(new_entry("TK-1", TicketStatus::InProgress))
                .unwrap();
        }

        let log = JsonHistory::open(&path).unwrap();
        let entries = log.entries("TK-1").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].status, TicketStatus::InProgress);
        assert_eq!(
            log.current_status("TK-1").unwrap(),
            Some(TicketStatus::InProgress)
        );
    }

    #[test]
    fn ids_keep_increasing_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");

        let first = {
            let mut log = JsonHistory::open(&path).unwrap();
            log.append(new_entry("TK-1", TicketStatus::Received))
                .unwrap()
                .id
        };
        let mut log = JsonHistory::open(&path).unwrap();
        let second = log
            .append(new_entry("TK-2", TicketStatus::Received))
            .unwrap()
            .id;
        assert!(second > first);
    }

    #[test]
    fn version_check_rejects_stale_writers() {
        let dir = tempdir().unwrap();
        let mut log = JsonHistory::open(dir.path().join("history.json")).unwrap();
        log.append(new_entry("TK-1", TicketStatus::Received)).unwrap();

        // A writer that read the journal before the append above.
        let err = log
            .append_versioned(new_entry("TK-1", TicketStatus::InProgress), 0)
            .unwrap_err();
        assert!(matches!(err, StorageError::ConcurrentConflict { .. }));

        // With the current version it goes through.
        log.append_versioned(new_entry("TK-1", TicketStatus::InProgress), 1)
            .unwrap();
        assert_eq!(log.version("TK-1"), 2);
    }

    #[test]
    fn versions_are_per_ticket() {
        let dir = tempdir().unwrap();
        let mut log = JsonHistory::open(dir.path().join("history.json")).unwrap();
        log.append(new_entry("TK-1", TicketStatus::Received)).unwrap();
        log.append(new_entry("TK-2", TicketStatus::Received)).unwrap();
        assert_eq!(log.version("TK-1"), 1);
        assert_eq!(log.version("TK-2"), 1);
        assert_eq!(log.version("TK-3"), 0);
    }

    #[test]
    fn executor_runs_against_the_json_backend() {
        use benchline_core::{execute, PaymentSnapshot, TransitionRequest};

        let dir = tempdir().unwrap();
        let mut log = JsonHistory::open(dir.path().join("history.json")).unwrap();
        log.append(new_entry("TK-1", TicketStatus::Received)).unwrap();

        let req = TransitionRequest {
            ticket_id: "TK-1".to_string(),
            current: TicketStatus::Received,
            target: TicketStatus::InProgress,
            role: Role::Technician,
            payment: PaymentSnapshot::settled(),
            reason: None,
            parts_attached: false,
        };
        let outcome = execute(&req, Some("bench 3"), &mut log).unwrap();
        assert_eq!(outcome.new_status, TicketStatus::InProgress);
        assert_eq!(
            outcome.entry.unwrap().notes.as_deref(),
            Some("bench 3")
        );
    }
}
