//! Return-window policy.
//!
//! Consulted by callers before acting on an `InitiateReturn` signal: a
//! completed device can only be returned within a configurable number of
//! days after completion. The clock is passed in, so the policy stays a
//! pure computation.

use time::OffsetDateTime;

/// Shop default when no window is configured.
pub const DEFAULT_RETURN_WINDOW_DAYS: u32 = 30;

/// Whether a completed ticket may still enter the return flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnEligibility {
    Eligible,
    /// The ticket was never completed, so there is nothing to return.
    NotCompleted,
    /// The window has passed.
    WindowExpired {
        days_since_completion: i64,
        window_days: u32,
    },
}

impl ReturnEligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, ReturnEligibility::Eligible)
    }
}

/// A configured return window, in whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnWindow {
    pub days: u32,
}

impl Default for ReturnWindow {
    fn default() -> Self {
        ReturnWindow {
            days: DEFAULT_RETURN_WINDOW_DAYS,
        }
    }
}

impl ReturnWindow {
    pub fn new(days: u32) -> Self {
        ReturnWindow { days }
    }

    /// Check a ticket's completion timestamp against the window.
    pub fn check(
        &self,
        completed_at: Option<OffsetDateTime>,
        now: OffsetDateTime,
    ) -> ReturnEligibility {
        let Some(completed_at) = completed_at else {
            return ReturnEligibility::NotCompleted;
        };
        let days_since_completion = (now - completed_at).whole_days();
        if days_since_completion > self.days as i64 {
            return ReturnEligibility::WindowExpired {
                days_since_completion,
                window_days: self.days,
            };
        }
        ReturnEligibility::Eligible
    }
}
