use benchline_core::HistoryError;

/// All errors a history backend can return.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Optimistic concurrency check failed — another writer appended to this
    /// ticket's history since the caller read it.
    #[error("concurrent write on ticket {ticket_id}: expected {expected_version} entries")]
    ConcurrentConflict {
        ticket_id: String,
        expected_version: usize,
    },

    /// The journal contains a record that no longer parses (unknown status
    /// or role name, malformed timestamp).
    #[error("corrupt history record: {0}")]
    Corrupt(String),

    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("journal serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<StorageError> for HistoryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConcurrentConflict {
                ticket_id,
                expected_version,
            } => HistoryError::Conflict {
                ticket_id,
                expected_version,
            },
            other => HistoryError::Backend(other.to_string()),
        }
    }
}
