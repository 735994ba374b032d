//! Ticket status and role vocabulary.
//!
//! Both enums are closed sets. Unknown names reaching the boundary are a
//! caller error and are rejected by `FromStr` before any graph lookup.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A malformed request value at the boundary. Never produced by the engine
/// itself; callers must not retry without fixing the input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("unknown ticket status: {0}")]
    UnknownStatus(String),
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

// ──────────────────────────────────────────────
// Ticket status
// ──────────────────────────────────────────────

/// The status of a repair ticket.
///
/// `Completed`, `Returned`, and `Cancelled` are terminal: no outgoing
/// transitions exist for them. `Returned` is reached only through the
/// external return approval process, never through a forward edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Received,
    InProgress,
    WaitingForParts,
    Repaired,
    Completed,
    Returned,
    Cancelled,
}

/// All statuses, in forward lifecycle order.
pub const ALL_STATUSES: [TicketStatus; 7] = [
    TicketStatus::Received,
    TicketStatus::InProgress,
    TicketStatus::WaitingForParts,
    TicketStatus::Repaired,
    TicketStatus::Completed,
    TicketStatus::Returned,
    TicketStatus::Cancelled,
];

impl TicketStatus {
    /// Wire name, as stored in history records and accepted at the boundary.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Received => "RECEIVED",
            TicketStatus::InProgress => "IN_PROGRESS",
            TicketStatus::WaitingForParts => "WAITING_FOR_PARTS",
            TicketStatus::Repaired => "REPAIRED",
            TicketStatus::Completed => "COMPLETED",
            TicketStatus::Returned => "RETURNED",
            TicketStatus::Cancelled => "CANCELLED",
        }
    }

    /// Whether this status has no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TicketStatus::Completed | TicketStatus::Returned | TicketStatus::Cancelled
        )
    }

    /// Human-readable label for UI display and notification text.
    pub fn label(&self) -> &'static str {
        match self {
            TicketStatus::Received => "Received",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::WaitingForParts => "Waiting for Parts",
            TicketStatus::Repaired => "Repaired",
            TicketStatus::Completed => "Completed",
            TicketStatus::Returned => "Returned",
            TicketStatus::Cancelled => "Cancelled",
        }
    }

    /// Badge color keyword used by the UI layer.
    pub fn color(&self) -> &'static str {
        match self {
            TicketStatus::Received => "blue",
            TicketStatus::InProgress => "yellow",
            TicketStatus::WaitingForParts => "orange",
            TicketStatus::Repaired => "green",
            TicketStatus::Completed => "emerald",
            TicketStatus::Returned => "purple",
            TicketStatus::Cancelled => "red",
        }
    }

    /// One-line description of what the status means.
    pub fn description(&self) -> &'static str {
        match self {
            TicketStatus::Received => "Device handed in, ticket created",
            TicketStatus::InProgress => "Technician has begun diagnostics/repair",
            TicketStatus::WaitingForParts => "Awaiting required inventory parts",
            TicketStatus::Repaired => "Repair completed, awaiting pickup",
            TicketStatus::Completed => "Device picked up by customer",
            TicketStatus::Returned => "Customer returned repaired device",
            TicketStatus::Cancelled => "Job aborted",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RECEIVED" => Ok(TicketStatus::Received),
            "IN_PROGRESS" => Ok(TicketStatus::InProgress),
            "WAITING_FOR_PARTS" => Ok(TicketStatus::WaitingForParts),
            "REPAIRED" => Ok(TicketStatus::Repaired),
            "COMPLETED" => Ok(TicketStatus::Completed),
            "RETURNED" => Ok(TicketStatus::Returned),
            "CANCELLED" => Ok(TicketStatus::Cancelled),
            other => Err(ValidationError::UnknownStatus(other.to_string())),
        }
    }
}

// ──────────────────────────────────────────────
// Roles
// ──────────────────────────────────────────────

/// The role of the acting user, resolved by the surrounding auth subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Staff,
    Technician,
}

/// All roles.
pub const ALL_ROLES: [Role; 3] = [Role::Admin, Role::Staff, Role::Technician];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
            Role::Technician => "TECHNICIAN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "STAFF" => Ok(Role::Staff),
            "TECHNICIAN" => Ok(Role::Technician),
            other => Err(ValidationError::UnknownRole(other.to_string())),
        }
    }
}
