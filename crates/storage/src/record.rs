use benchline_core::HistoryEntry;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::StorageError;

/// The persisted form of a history entry: status and role as their wire
/// names, timestamp as an RFC 3339 string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    pub ticket_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub actor: String,
    pub created_at: String,
}

impl HistoryRecord {
    pub fn from_entry(entry: &HistoryEntry) -> Result<Self, StorageError> {
        let created_at = entry
            .created_at
            .format(&Rfc3339)
            .map_err(|e| StorageError::Corrupt(format!("unformattable timestamp: {e}")))?;
        Ok(HistoryRecord {
            id: entry.id,
            ticket_id: entry.ticket_id.clone(),
            status: entry.status.to_string(),
            notes: entry.notes.clone(),
            actor: entry.actor.to_string(),
            created_at,
        })
    }

    pub fn to_entry(&self) -> Result<HistoryEntry, StorageError> {
        let status = self
            .status
            .parse()
            .map_err(|e| StorageError::Corrupt(format!("record {}: {e}", self.id)))?;
        let actor = self
            .actor
            .parse()
            .map_err(|e| StorageError::Corrupt(format!("record {}: {e}", self.id)))?;
        let created_at = OffsetDateTime::parse(&self.created_at, &Rfc3339)
            .map_err(|e| StorageError::Corrupt(format!("record {}: bad timestamp: {e}", self.id)))?;
        Ok(HistoryEntry {
            id: self.id,
            ticket_id: self.ticket_id.clone(),
            status,
            notes: self.notes.clone(),
            actor,
            created_at,
        })
    }
}
