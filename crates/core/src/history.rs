//! The append-only history log.
//!
//! Every committed transition appends exactly one entry; entries are never
//! modified or deleted. The current status of a ticket is always the status
//! of its most recent entry. The trait is synchronous: the engine has no
//! suspension points, and durable backends wrap calls in their own
//! transaction mechanism.

use std::collections::BTreeMap;

use time::OffsetDateTime;

use crate::status::{Role, TicketStatus};

/// One immutable audit record of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Assigned by the log; monotonically increasing, so replay order never
    /// depends on clock resolution.
    pub id: i64,
    pub ticket_id: String,
    pub status: TicketStatus,
    /// For `Cancelled` entries this is always the non-empty cancellation
    /// reason.
    pub notes: Option<String>,
    pub actor: Role,
    pub created_at: OffsetDateTime,
}

/// The fields the executor supplies; the log assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub ticket_id: String,
    pub status: TicketStatus,
    pub notes: Option<String>,
    pub actor: Role,
}

/// Errors surfaced by a history backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    /// Another writer appended to this ticket's history concurrently. The
    /// caller must re-fetch and re-evaluate; this is a persistence failure,
    /// not a lifecycle denial.
    #[error("concurrent write on ticket {ticket_id}: expected {expected_version} entries")]
    Conflict {
        ticket_id: String,
        expected_version: usize,
    },
    /// A backend-specific failure (I/O, serialization, connection).
    #[error("history backend error: {0}")]
    Backend(String),
}

/// An append-only, per-ticket ordered record of past transitions.
pub trait HistoryLog {
    /// Append one entry, assigning its id and timestamp.
    fn append(&mut self, entry: NewHistoryEntry) -> Result<HistoryEntry, HistoryError>;

    /// All entries for a ticket in replay order (oldest first).
    fn entries(&self, ticket_id: &str) -> Result<Vec<HistoryEntry>, HistoryError>;

    /// All entries for a ticket in display order (newest first).
    fn entries_newest_first(&self, ticket_id: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries = self.entries(ticket_id)?;
        entries.reverse();
        Ok(entries)
    }

    /// The status of the ticket's most recent entry, or `None` for a ticket
    /// with no recorded history yet.
    fn current_status(&self, ticket_id: &str) -> Result<Option<TicketStatus>, HistoryError> {
        Ok(self.entries(ticket_id)?.last().map(|entry| entry.status))
    }
}

// ──────────────────────────────────────────────
// In-memory reference implementation
// ──────────────────────────────────────────────

/// In-memory history log. The reference implementation used by the engine's
/// own tests and by callers that keep history inside a larger transaction.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: BTreeMap<String, Vec<HistoryEntry>>,
    next_id: i64,
}

impl MemoryHistory {
    pub fn new() -> Self {
        MemoryHistory::default()
    }

    /// Total number of entries across all tickets.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HistoryLog for MemoryHistory {
    fn append(&mut self, entry: NewHistoryEntry) -> Result<HistoryEntry, HistoryError> {
        self.next_id += 1;
        let entry = HistoryEntry {
            id: self.next_id,
            ticket_id: entry.ticket_id,
            status: entry.status,
            notes: entry.notes,
            actor: entry.actor,
            created_at: OffsetDateTime::now_utc(),
        };
        self.entries
            .entry(entry.ticket_id.clone())
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    fn entries(&self, ticket_id: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.entries.get(ticket_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn received(ticket_id: &str) -> NewHistoryEntry {
        NewHistoryEntry {
            ticket_id: ticket_id.to_string(),
            status: TicketStatus::Received,
            notes: None,
            actor: Role::Staff,
        }
    }

    #[test]
    fn append_assigns_increasing_ids() {
        let mut log = MemoryHistory::new();
        let first = log.append(received("T-1")).unwrap();
        let second = log.append(received("T-2")).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn entries_are_in_replay_order() {
        let mut log = MemoryHistory::new();
        log.append(received("T-1")).unwrap();
        log.append(NewHistoryEntry {
            ticket_id: "T-1".to_string(),
            status: TicketStatus::InProgress,
            notes: None,
            actor: Role::Technician,
        })
        .unwrap();

        let asc = log.entries("T-1").unwrap();
        assert_eq!(asc[0].status, TicketStatus::Received);
        assert_eq!(asc[1].status, TicketStatus::InProgress);

        let desc = log.entries_newest_first("T-1").unwrap();
        assert_eq!(desc[0].status, TicketStatus::InProgress);
    }

    #[test]
    fn current_status_is_most_recent_entry() {
        let mut log = MemoryHistory::new();
        assert_eq!(log.current_status("T-1").unwrap(), None);
        log.append(received("T-1")).unwrap();
        log.append(NewHistoryEntry {
            ticket_id: "T-1".to_string(),
            status: TicketStatus::InProgress,
            notes: None,
            actor: Role::Technician,
        })
        .unwrap();
        assert_eq!(
            log.current_status("T-1").unwrap(),
            Some(TicketStatus::InProgress)
        );
    }

    #[test]
    fn tickets_are_isolated() {
        let mut log = MemoryHistory::new();
        log.append(received("T-1")).unwrap();
        log.append(received("T-2")).unwrap();
        assert_eq!(log.entries("T-1").unwrap().len(), 1);
        assert_eq!(log.entries("T-2").unwrap().len(), 1);
        assert_eq!(log.len(), 2);
    }
}
