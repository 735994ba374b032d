//! benchline-storage: durable history log backends.
//!
//! Provides the serde record format for history entries and a JSON-file
//! journal implementing the core [`benchline_core::HistoryLog`] trait, with
//! an optimistic version check for multi-writer deployments.

mod error;
mod json;
mod record;

pub use error::StorageError;
pub use json::JsonHistory;
pub use record::HistoryRecord;
