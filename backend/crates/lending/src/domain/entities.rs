//! Domain Entities
//!
//! Copies on the shelf and the loan ledger that records every borrow and return.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use kernel::id::LoanId;
use serde::{Deserialize, Serialize};

/// Catalog key of a single lendable copy
pub type CopyId = i64;

/// BookCopy entity - one physical instance of a book
///
/// `available` and `due_date` move together: an available copy has no due
/// date, a lent copy always has one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCopy {
    pub copy_id: CopyId,
    pub title: String,
    pub author: String,
    pub category: String,
    pub available: bool,
    pub due_date: Option<DateTime<Utc>>,
}

impl BookCopy {
    /// A copy on the shelf
    pub fn new(
        copy_id: CopyId,
        title: impl Into<String>,
        author: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            copy_id,
            title: title.into(),
            author: author.into(),
            category: category.into(),
            available: true,
            due_date: None,
        }
    }

    pub fn check_out(&mut self, due_date: DateTime<Utc>) {
        self.available = false;
        self.due_date = Some(due_date);
    }

    pub fn check_in(&mut self) {
        self.available = true;
        self.due_date = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerAction {
    Borrow,
    Return,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown ledger action: {0}")]
pub struct UnknownLedgerAction(pub String);

impl LedgerAction {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LedgerAction::Borrow => "borrow",
            LedgerAction::Return => "return",
        }
    }
}

impl FromStr for LedgerAction {
    type Err = UnknownLedgerAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrow" => Ok(LedgerAction::Borrow),
            "return" => Ok(LedgerAction::Return),
            other => Err(UnknownLedgerAction(other.to_string())),
        }
    }
}

impl fmt::Display for LedgerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// LedgerEntry entity - one event in the loan history
///
/// A borrow row stays "open" until a return stamps `returned_at` on it. The
/// return itself is appended as its own row carrying both timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub loan_id: LoanId,
    /// Canonical account name
    pub account: String,
    pub copy_id: CopyId,
    pub action: LedgerAction,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    pub fn borrow(account: impl Into<String>, copy_id: CopyId, now: DateTime<Utc>) -> Self {
        Self {
            loan_id: LoanId::new(),
            account: account.into(),
            copy_id,
            action: LedgerAction::Borrow,
            borrowed_at: now,
            returned_at: None,
        }
    }

    /// Return event closing `open`
    pub fn return_of(open: &LedgerEntry, now: DateTime<Utc>) -> Self {
        Self {
            loan_id: LoanId::new(),
            account: open.account.clone(),
            copy_id: open.copy_id,
            action: LedgerAction::Return,
            borrowed_at: open.borrowed_at,
            returned_at: Some(now),
        }
    }

    pub fn is_open_borrow(&self) -> bool {
        self.action == LedgerAction::Borrow && self.returned_at.is_none()
    }

    /// When the event happened
    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self.action {
            LedgerAction::Borrow => self.borrowed_at,
            LedgerAction::Return => self.returned_at.unwrap_or(self.borrowed_at),
        }
    }
}

/// An open borrow joined with the copy it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenLoan {
    pub loan_id: LoanId,
    pub account: String,
    pub copy_id: CopyId,
    pub title: String,
    pub author: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
}

impl OpenLoan {
    pub fn from_parts(entry: &LedgerEntry, copy: &BookCopy) -> Self {
        Self {
            loan_id: entry.loan_id,
            account: entry.account.clone(),
            copy_id: copy.copy_id,
            title: copy.title.clone(),
            author: copy.author.clone(),
            borrowed_at: entry.borrowed_at,
            due_date: copy.due_date,
        }
    }

    /// Overdue is derived from the due date, never stored
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date.is_some_and(|due| due < now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap()
    }

    #[test]
    fn checkout_and_checkin_keep_fields_in_step() {
        let mut copy = BookCopy::new(42, "Dune", "Frank Herbert", "Sci-Fi");
        assert!(copy.available);
        assert_eq!(copy.due_date, None);

        copy.check_out(t0() + Duration::days(14));
        assert!(!copy.available);
        assert!(copy.due_date.is_some());

        copy.check_in();
        assert!(copy.available);
        assert_eq!(copy.due_date, None);
    }

    #[test]
    fn return_event_carries_both_timestamps() {
        let borrow = LedgerEntry::borrow("alice", 42, t0());
        assert!(borrow.is_open_borrow());

        let later = t0() + Duration::days(3);
        let ret = LedgerEntry::return_of(&borrow, later);
        assert_eq!(ret.action, LedgerAction::Return);
        assert_eq!(ret.borrowed_at, t0());
        assert_eq!(ret.occurred_at(), later);
        assert!(!ret.is_open_borrow());
        assert_ne!(ret.loan_id, borrow.loan_id);
    }

    #[test]
    fn overdue_only_after_due_date() {
        let mut copy = BookCopy::new(7, "Emma", "Jane Austen", "Classics");
        let due = t0() + Duration::days(14);
        copy.check_out(due);
        let loan = OpenLoan::from_parts(&LedgerEntry::borrow("alice", 7, t0()), &copy);

        assert!(!loan.is_overdue(due));
        assert!(loan.is_overdue(due + Duration::seconds(1)));
    }

    #[test]
    fn action_text_round_trip() {
        assert_eq!("borrow".parse::<LedgerAction>().unwrap(), LedgerAction::Borrow);
        assert_eq!(LedgerAction::Return.to_string(), "return");
        assert!("lend".parse::<LedgerAction>().is_err());
    }
}
