//! The guard evaluator: data-dependent preconditions on top of a
//! graph-and-role-approved edge.
//!
//! Each guard is a pure predicate over the request. Guards compose with
//! logical AND; the first failure wins. There is no guard for
//! `WAITING_FOR_PARTS` — whether parts exist only shapes the follow-up
//! signal, it never blocks a transition.

use rust_decimal::Decimal;

use crate::check::TransitionRequest;
use crate::status::TicketStatus;

/// Amounts at or below this are treated as settled. Absorbs floating-point
/// rounding from upstream currency arithmetic; the engine itself computes
/// with `Decimal` only.
pub fn payment_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// Run every guard applicable to the request's target. Returns the first
/// failing guard's reason, or `None` when all pass.
pub fn evaluate(req: &TransitionRequest) -> Option<&'static str> {
    payment_guard(req).or_else(|| reason_guard(req))
}

/// Completion requires the balance to be cleared.
fn payment_guard(req: &TransitionRequest) -> Option<&'static str> {
    if req.target == TicketStatus::Completed && req.payment.outstanding > payment_tolerance() {
        return Some("payment required");
    }
    None
}

/// Cancellation requires a non-blank reason for the audit trail.
fn reason_guard(req: &TransitionRequest) -> Option<&'static str> {
    if req.target == TicketStatus::Cancelled
        && !req
            .reason
            .as_ref()
            .is_some_and(|reason| !reason.trim().is_empty())
    {
        return Some("cancellation reason required");
    }
    None
}
