//! The transition executor.
//!
//! Given a request the checker has approved, produce the persisted effects:
//! the new status, one appended history entry, and a follow-up signal for
//! the caller's collaborators (parts editor, payment collector, return
//! initiator, notification dispatch). The executor re-validates internally
//! and fails closed, so a stale or never-checked request can not commit.

use serde::{Deserialize, Serialize};

use crate::check::{check, Denial, TransitionRequest};
use crate::guard;
use crate::history::{HistoryEntry, HistoryError, HistoryLog, NewHistoryEntry};
use crate::status::TicketStatus;

// ──────────────────────────────────────────────
// Outcome types
// ──────────────────────────────────────────────

/// What secondary workflow the calling application should present after a
/// transition commits. Callers match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpSignal {
    /// Parts must be attached (entering a parts-bearing state, or marked
    /// repaired with no parts recorded).
    RequireParts,
    /// Repair is done but a balance is still owed.
    RequirePayment,
    /// Re-confirmation of an active state: open the parts editor.
    ManageParts,
    /// Re-confirmation of `REPAIRED`: open the payment collector.
    CollectPayment,
    /// Re-confirmation of `COMPLETED`: open the return initiator.
    InitiateReturn,
    /// Nothing further to do.
    None,
}

/// What `execute` returns on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub new_status: TicketStatus,
    /// The appended audit record. `None` for a re-confirmation, which
    /// changes nothing and records nothing.
    pub entry: Option<HistoryEntry>,
    pub follow_up: FollowUpSignal,
}

/// Fatal executor failures. All of them mean the call must not be retried
/// as-is: the caller re-fetches the current status and re-evaluates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecuteError {
    /// The request no longer satisfies `check` (or never did).
    #[error("transition rejected: {denial}")]
    Conflict { denial: Denial },
    /// The request's view of the current status disagrees with the log.
    #[error("stale status: request says {expected}, history says {actual}")]
    StaleStatus {
        expected: TicketStatus,
        actual: TicketStatus,
    },
    /// The history backend failed; nothing was committed.
    #[error(transparent)]
    History(#[from] HistoryError),
}

// ──────────────────────────────────────────────
// Execution
// ──────────────────────────────────────────────

/// Commit an approved transition.
///
/// Re-runs `check` and compares the request's `current` against the log's
/// latest status before writing anything; on success the appended entry and
/// the status change are one logical write (durable backends wrap the
/// append in their own transaction).
///
/// `notes` become the history entry's notes; for a cancellation with no
/// explicit notes the cancellation reason is recorded instead, so cancelled
/// entries always carry one.
pub fn execute<L: HistoryLog>(
    req: &TransitionRequest,
    notes: Option<&str>,
    log: &mut L,
) -> Result<TransitionOutcome, ExecuteError> {
    let verdict = check(req);
    if let Some(denial) = verdict.denial {
        return Err(ExecuteError::Conflict { denial });
    }

    if let Some(actual) = log.current_status(&req.ticket_id)? {
        if actual != req.current {
            return Err(ExecuteError::StaleStatus {
                expected: req.current,
                actual,
            });
        }
    }

    // Re-confirmation: no status change, no audit record, just the signal.
    if req.current == req.target {
        return Ok(TransitionOutcome {
            new_status: req.current,
            entry: None,
            follow_up: reconfirmation_signal(req.current),
        });
    }

    let entry = log.append(NewHistoryEntry {
        ticket_id: req.ticket_id.clone(),
        status: req.target,
        notes: effective_notes(req, notes),
        actor: req.role,
    })?;

    Ok(TransitionOutcome {
        new_status: req.target,
        entry: Some(entry),
        follow_up: follow_up_for(req),
    })
}

/// Notes to record: explicit notes win; a cancellation falls back to its
/// reason. Blank strings are recorded as absent.
fn effective_notes(req: &TransitionRequest, notes: Option<&str>) -> Option<String> {
    let explicit = notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    if explicit.is_some() {
        return explicit;
    }
    if req.target == TicketStatus::Cancelled {
        // The reason guard has already rejected blank reasons.
        return req
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
    }
    None
}

/// Signal for re-confirming an already-current status (a "re-click").
fn reconfirmation_signal(status: TicketStatus) -> FollowUpSignal {
    match status {
        TicketStatus::InProgress | TicketStatus::WaitingForParts => FollowUpSignal::ManageParts,
        TicketStatus::Repaired => FollowUpSignal::CollectPayment,
        TicketStatus::Completed => FollowUpSignal::InitiateReturn,
        _ => FollowUpSignal::None,
    }
}

/// Signal for a real status change.
fn follow_up_for(req: &TransitionRequest) -> FollowUpSignal {
    match req.target {
        TicketStatus::WaitingForParts => FollowUpSignal::RequireParts,
        TicketStatus::Repaired if !req.parts_attached => FollowUpSignal::RequireParts,
        TicketStatus::Repaired if req.payment.outstanding > guard::payment_tolerance() => {
            FollowUpSignal::RequirePayment
        }
        _ => FollowUpSignal::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::PaymentSnapshot;
    use crate::history::MemoryHistory;
    use crate::status::Role;
    use rust_decimal::Decimal;

    fn request(
        current: TicketStatus,
        target: TicketStatus,
        role: Role,
        payment: PaymentSnapshot,
    ) -> TransitionRequest {
        TransitionRequest {
            ticket_id: "T-42".to_string(),
            current,
            target,
            role,
            payment,
            reason: None,
            parts_attached: true,
        }
    }

    fn seed(log: &mut MemoryHistory, statuses: &[TicketStatus]) {
        for &status in statuses {
            log.append(NewHistoryEntry {
                ticket_id: "T-42".to_string(),
                status,
                notes: None,
                actor: Role::Staff,
            })
            .unwrap();
        }
    }

    #[test]
    fn commit_appends_entry_and_reports_new_status() {
        let mut log = MemoryHistory::new();
        seed(&mut log, &[TicketStatus::Received]);
        let req = request(
            TicketStatus::Received,
            TicketStatus::InProgress,
            Role::Technician,
            PaymentSnapshot::owing(Decimal::new(8000, 2)),
        );

        let outcome = execute(&req, None, &mut log).unwrap();
        assert_eq!(outcome.new_status, TicketStatus::InProgress);
        let entry = outcome.entry.unwrap();
        assert_eq!(entry.status, TicketStatus::InProgress);
        assert_eq!(entry.actor, Role::Technician);
        assert_eq!(
            log.current_status("T-42").unwrap(),
            Some(TicketStatus::InProgress)
        );
    }

    #[test]
    fn denied_request_fails_closed_without_writing() {
        let mut log = MemoryHistory::new();
        seed(&mut log, &[TicketStatus::Received]);
        let req = request(
            TicketStatus::Received,
            TicketStatus::Completed,
            Role::Admin,
            PaymentSnapshot::settled(),
        );

        let err = execute(&req, None, &mut log).unwrap_err();
        assert!(matches!(err, ExecuteError::Conflict { .. }));
        assert_eq!(log.entries("T-42").unwrap().len(), 1);
    }

    #[test]
    fn stale_current_status_conflicts() {
        let mut log = MemoryHistory::new();
        seed(&mut log, &[TicketStatus::Received, TicketStatus::InProgress]);
        // Request was built from a stale read that still says RECEIVED.
        let req = request(
            TicketStatus::Received,
            TicketStatus::InProgress,
            Role::Staff,
            PaymentSnapshot::settled(),
        );

        let err = execute(&req, None, &mut log).unwrap_err();
        assert_eq!(
            err,
            ExecuteError::StaleStatus {
                expected: TicketStatus::Received,
                actual: TicketStatus::InProgress,
            }
        );
        assert_eq!(log.entries("T-42").unwrap().len(), 2);
    }

    #[test]
    fn ticket_with_no_history_trusts_the_request() {
        let mut log = MemoryHistory::new();
        let req = request(
            TicketStatus::Received,
            TicketStatus::InProgress,
            Role::Technician,
            PaymentSnapshot::settled(),
        );
        assert!(execute(&req, None, &mut log).is_ok());
    }

    #[test]
    fn cancellation_records_the_reason_as_notes() {
        let mut log = MemoryHistory::new();
        seed(&mut log, &[TicketStatus::InProgress]);
        let mut req = request(
            TicketStatus::InProgress,
            TicketStatus::Cancelled,
            Role::Admin,
            PaymentSnapshot::settled(),
        );
        req.reason = Some("customer withdrew device".to_string());

        let outcome = execute(&req, None, &mut log).unwrap();
        let entry = outcome.entry.unwrap();
        assert_eq!(entry.notes.as_deref(), Some("customer withdrew device"));
        assert_eq!(outcome.follow_up, FollowUpSignal::None);
    }

    #[test]
    fn explicit_notes_win_over_cancellation_reason() {
        let mut log = MemoryHistory::new();
        let mut req = request(
            TicketStatus::InProgress,
            TicketStatus::Cancelled,
            Role::Staff,
            PaymentSnapshot::settled(),
        );
        req.reason = Some("duplicate ticket".to_string());

        let outcome = execute(&req, Some("opened twice by mistake"), &mut log).unwrap();
        assert_eq!(
            outcome.entry.unwrap().notes.as_deref(),
            Some("opened twice by mistake")
        );
    }

    #[test]
    fn waiting_for_parts_signals_require_parts() {
        let mut log = MemoryHistory::new();
        let req = request(
            TicketStatus::InProgress,
            TicketStatus::WaitingForParts,
            Role::Technician,
            PaymentSnapshot::settled(),
        );
        let outcome = execute(&req, None, &mut log).unwrap();
        assert_eq!(outcome.follow_up, FollowUpSignal::RequireParts);
    }

    #[test]
    fn repaired_without_parts_signals_require_parts() {
        let mut log = MemoryHistory::new();
        let mut req = request(
            TicketStatus::InProgress,
            TicketStatus::Repaired,
            Role::Technician,
            PaymentSnapshot::owing(Decimal::new(3000, 2)),
        );
        req.parts_attached = false;
        let outcome = execute(&req, None, &mut log).unwrap();
        assert_eq!(outcome.follow_up, FollowUpSignal::RequireParts);
    }

    #[test]
    fn repaired_with_balance_signals_require_payment() {
        let mut log = MemoryHistory::new();
        let req = request(
            TicketStatus::InProgress,
            TicketStatus::Repaired,
            Role::Technician,
            PaymentSnapshot::owing(Decimal::new(3000, 2)),
        );
        let outcome = execute(&req, None, &mut log).unwrap();
        assert_eq!(outcome.follow_up, FollowUpSignal::RequirePayment);
    }

    #[test]
    fn settled_completion_signals_nothing() {
        let mut log = MemoryHistory::new();
        seed(&mut log, &[TicketStatus::Repaired]);
        let req = request(
            TicketStatus::Repaired,
            TicketStatus::Completed,
            Role::Staff,
            PaymentSnapshot::settled(),
        );
        let outcome = execute(&req, None, &mut log).unwrap();
        assert_eq!(outcome.follow_up, FollowUpSignal::None);
    }

    #[test]
    fn reconfirmations_signal_without_writing() {
        let cases = [
            (TicketStatus::InProgress, FollowUpSignal::ManageParts),
            (TicketStatus::WaitingForParts, FollowUpSignal::ManageParts),
            (TicketStatus::Repaired, FollowUpSignal::CollectPayment),
            (TicketStatus::Completed, FollowUpSignal::InitiateReturn),
            (TicketStatus::Received, FollowUpSignal::None),
        ];
        for (status, expected) in cases {
            let mut log = MemoryHistory::new();
            seed(&mut log, &[status]);
            let req = request(status, status, Role::Staff, PaymentSnapshot::settled());
            let outcome = execute(&req, None, &mut log).unwrap();
            assert_eq!(outcome.follow_up, expected, "re-click on {status}");
            assert_eq!(outcome.new_status, status);
            assert!(outcome.entry.is_none());
            assert_eq!(log.entries("T-42").unwrap().len(), 1);
        }
    }
}
