//! Notification text for committed transitions, consumed by the
//! notification dispatch collaborator.

use crate::status::TicketStatus;

/// Message announcing a status change on a ticket.
pub fn status_change_message(
    ticket_number: &str,
    from: TicketStatus,
    to: TicketStatus,
) -> String {
    format!(
        "Ticket {} status changed from {} to {}",
        ticket_number,
        from.label(),
        to.label()
    )
}
