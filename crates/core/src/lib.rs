//! benchline-core: the repair-ticket status lifecycle engine.
//!
//! Decides whether a requested status change is legal given the ticket's
//! current status, the acting user's role, and a caller-supplied payment
//! snapshot, and what follow-up action (if any) must accompany the change.
//!
//! Data flows one way: the caller builds a [`TransitionRequest`], runs
//! [`check`] to get a [`TransitionResult`], and — if allowed — invokes
//! [`execute`], which appends one [`HistoryEntry`] to the [`HistoryLog`] and
//! returns the new status plus a [`FollowUpSignal`] for the caller's
//! collaborators. The engine is synchronous, stateless between calls, and
//! performs no persistence of its own.

pub mod check;
pub mod execute;
pub mod graph;
pub mod guard;
pub mod history;
pub mod notify;
pub mod returns;
pub mod role;
pub mod status;

// ── Convenience re-exports ────────────────────────────────────────────

pub use check::{check, Denial, DenialCode, PaymentSnapshot, TransitionRequest, TransitionResult};
pub use execute::{execute, ExecuteError, FollowUpSignal, TransitionOutcome};
pub use graph::{edges_from, is_edge};
pub use history::{HistoryEntry, HistoryError, HistoryLog, MemoryHistory, NewHistoryEntry};
pub use notify::status_change_message;
pub use returns::{ReturnEligibility, ReturnWindow, DEFAULT_RETURN_WINDOW_DAYS};
pub use role::allowed_for;
pub use status::{Role, TicketStatus, ValidationError, ALL_ROLES, ALL_STATUSES};
