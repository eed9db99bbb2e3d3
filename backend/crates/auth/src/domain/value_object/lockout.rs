//! Lockout and derived account state

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Login suspension after too many failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lockout {
    /// Reader lockout; clears itself once the instant has passed
    Until(DateTime<Utc>),
    /// Librarian lockout; only an administrative reset clears it
    Indefinite,
}

impl Lockout {
    /// Whole minutes left, rounded up. `None` for an indefinite lockout.
    pub fn remaining_minutes(&self, now: DateTime<Utc>) -> Option<i64> {
        match self {
            Lockout::Until(until) => {
                let left = (*until - now).max(Duration::zero());
                let whole = left.num_minutes();
                // Sub-minute remainders, down to the nanosecond, count as a minute
                if left > Duration::minutes(whole) {
                    Some(whole + 1)
                } else {
                    Some(whole)
                }
            }
            Lockout::Indefinite => None,
        }
    }

    #[inline]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self, Lockout::Until(until) if *until <= now)
    }

    /// Split into the `locked_until` / `locked_indefinitely` column pair.
    pub fn to_columns(lockout: Option<Lockout>) -> (Option<DateTime<Utc>>, bool) {
        match lockout {
            None => (None, false),
            Some(Lockout::Until(until)) => (Some(until), false),
            Some(Lockout::Indefinite) => (None, true),
        }
    }

    pub fn from_columns(locked_until: Option<DateTime<Utc>>, indefinite: bool) -> Option<Lockout> {
        if indefinite {
            Some(Lockout::Indefinite)
        } else {
            locked_until.map(Lockout::Until)
        }
    }
}

/// Account state as seen by the login state machine at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AccountState {
    Active,
    TemporarilyLocked { until: DateTime<Utc> },
    PermanentlyLocked,
    /// Librarian whose password is older than the rotation period
    PasswordExpired,
}
