//! The role gate.
//!
//! Narrows the graph's edges for a given role before guards are applied.
//! Admin and staff may take every graph edge. Technicians are limited to
//! forward-progress edges: they may never cancel a ticket and may not mark
//! a repaired ticket completed (that hand-off involves collecting payment).

use crate::graph;
use crate::status::{Role, TicketStatus};

/// The edges a technician may take. Everything else is denied for that role.
const TECHNICIAN_EDGES: &[(TicketStatus, TicketStatus)] = &[
    (TicketStatus::Received, TicketStatus::InProgress),
    (TicketStatus::InProgress, TicketStatus::WaitingForParts),
    (TicketStatus::InProgress, TicketStatus::Repaired),
    (TicketStatus::WaitingForParts, TicketStatus::InProgress),
    (TicketStatus::WaitingForParts, TicketStatus::Repaired),
];

/// Whether `role` is permitted to take the edge `from -> to`.
///
/// Only meaningful for edges the graph actually contains; a permitted
/// non-edge is still rejected by the checker's graph lookup.
pub fn permits(role: Role, from: TicketStatus, to: TicketStatus) -> bool {
    match role {
        Role::Admin | Role::Staff => true,
        Role::Technician => TECHNICIAN_EDGES.contains(&(from, to)),
    }
}

/// The graph's edges from `status`, filtered to those `role` may take.
pub fn allowed_for(role: Role, status: TicketStatus) -> Vec<TicketStatus> {
    graph::edges_from(status)
        .iter()
        .copied()
        .filter(|&target| permits(role, status, target))
        .collect()
}
