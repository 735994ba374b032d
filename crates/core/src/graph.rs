//! The static transition graph.
//!
//! Declares which statuses are directly reachable from each status,
//! independent of who is asking and of any ticket data. `RETURNED` has no
//! inbound edge here; it is reached only through the return approval flow.

use crate::status::TicketStatus;

/// Statuses directly reachable from `status` by one transition.
///
/// Terminal statuses return the empty slice.
pub fn edges_from(status: TicketStatus) -> &'static [TicketStatus] {
    match status {
        TicketStatus::Received => &[TicketStatus::InProgress, TicketStatus::Cancelled],
        TicketStatus::InProgress => &[
            TicketStatus::WaitingForParts,
            TicketStatus::Repaired,
            TicketStatus::Cancelled,
        ],
        TicketStatus::WaitingForParts => &[
            TicketStatus::InProgress,
            TicketStatus::Repaired,
            TicketStatus::Cancelled,
        ],
        TicketStatus::Repaired => &[TicketStatus::Completed, TicketStatus::Cancelled],
        TicketStatus::Completed | TicketStatus::Returned | TicketStatus::Cancelled => &[],
    }
}

/// Whether the graph contains the edge `from -> to`.
pub fn is_edge(from: TicketStatus, to: TicketStatus) -> bool {
    edges_from(from).contains(&to)
}
