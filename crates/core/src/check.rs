//! The transition checker: the single decision function every caller goes
//! through.
//!
//! `check` composes the transition graph, the role gate, and the guard
//! evaluator into one pure computation. It never mutates anything, so it is
//! safe to call speculatively (e.g. to decide which buttons a UI enables).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::guard;
use crate::status::{Role, TicketStatus};
use crate::{graph, role};

// ──────────────────────────────────────────────
// Request / result types
// ──────────────────────────────────────────────

/// The payment state of a ticket at request time. Supplied by the caller;
/// the engine never queries the payment subsystem itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSnapshot {
    pub paid: bool,
    /// The unpaid portion of the ticket's final or estimated price. Never
    /// negative.
    pub outstanding: Decimal,
}

impl PaymentSnapshot {
    /// A snapshot with nothing owed.
    pub fn settled() -> Self {
        PaymentSnapshot {
            paid: true,
            outstanding: Decimal::ZERO,
        }
    }

    /// A snapshot with `outstanding` still owed.
    pub fn owing(outstanding: Decimal) -> Self {
        PaymentSnapshot {
            paid: false,
            outstanding,
        }
    }
}

/// A proposed status change for one ticket. Ephemeral: built per call and
/// discarded once the decision is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    pub ticket_id: String,
    pub current: TicketStatus,
    pub target: TicketStatus,
    pub role: Role,
    pub payment: PaymentSnapshot,
    /// Required when the target is `Cancelled`; recorded as the history
    /// entry's notes.
    pub reason: Option<String>,
    /// Whether the ticket currently has inventory parts attached. Never
    /// blocks a transition; only shapes the follow-up signal.
    pub parts_attached: bool,
}

/// Why a transition was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialCode {
    /// The graph has no such edge (includes anything out of a terminal
    /// status).
    NoSuchTransition,
    /// The edge exists but the acting role may not take it.
    PermissionDenied,
    /// Graph and role are fine but a data-dependent precondition failed.
    GuardViolation,
    /// `RETURNED` can only be reached via the return approval flow.
    ReturnFlowRequired,
}

/// A denial with its actionable, human-readable reason. The UI surfaces the
/// reason verbatim or maps it to a localized message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denial {
    pub code: DenialCode,
    pub reason: String,
}

impl std::fmt::Display for Denial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

/// The checker's verdict. A pure value with no side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResult {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denial: Option<Denial>,
}

impl TransitionResult {
    pub fn allowed() -> Self {
        TransitionResult {
            allowed: true,
            denial: None,
        }
    }

    pub fn denied(code: DenialCode, reason: impl Into<String>) -> Self {
        TransitionResult {
            allowed: false,
            denial: Some(Denial {
                code,
                reason: reason.into(),
            }),
        }
    }

    /// The denial reason, if any.
    pub fn denial_reason(&self) -> Option<&str> {
        self.denial.as_ref().map(|d| d.reason.as_str())
    }
}

// ──────────────────────────────────────────────
// The decision function
// ──────────────────────────────────────────────

/// Decide whether `req` describes a legal transition.
///
/// Evaluation order:
/// 1. Re-confirming the current status is allowed (a "re-click"); the
///    executor maps it to a follow-up signal and records nothing.
/// 2. `RETURNED` as a target is denied with a pointer to the return flow.
/// 3. The edge must exist in the graph.
/// 4. The role gate must permit the edge.
/// 5. Every guard applicable to the target must pass; the first failing
///    guard's reason wins.
pub fn check(req: &TransitionRequest) -> TransitionResult {
    if req.current == req.target {
        return TransitionResult::allowed();
    }

    if req.target == TicketStatus::Returned {
        return TransitionResult::denied(
            DenialCode::ReturnFlowRequired,
            "returns go through the return approval process",
        );
    }

    if !graph::is_edge(req.current, req.target) {
        return TransitionResult::denied(DenialCode::NoSuchTransition, "no such transition");
    }

    if !role::permits(req.role, req.current, req.target) {
        return TransitionResult::denied(DenialCode::PermissionDenied, "role not permitted");
    }

    if let Some(reason) = guard::evaluate(req) {
        return TransitionResult::denied(DenialCode::GuardViolation, reason);
    }

    TransitionResult::allowed()
}
