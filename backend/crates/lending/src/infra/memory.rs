//! In-memory lending store
//!
//! Backs tests and local runs without Postgres. A single async mutex guards
//! copies and ledger together; a transaction holds the guard and works on a
//! staged copy that replaces the state on commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::LoanId;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::entities::{BookCopy, CopyId, LedgerAction, LedgerEntry, OpenLoan};
use crate::domain::repository::{
    CatalogRepository, LedgerRepository, LendingTx, LendingUnitOfWork,
};
use crate::domain::value_objects::CatalogQuery;
use crate::error::{LendingError, LendingResult};

#[derive(Debug, Clone, Default)]
struct LendingState {
    copies: BTreeMap<CopyId, BookCopy>,
    /// Append order
    ledger: Vec<LedgerEntry>,
}

impl LendingState {
    fn open_loans(&self, mut keep: impl FnMut(&LedgerEntry, &BookCopy) -> bool) -> Vec<OpenLoan> {
        let mut loans: Vec<OpenLoan> = self
            .ledger
            .iter()
            .filter(|entry| entry.is_open_borrow())
            .filter_map(|entry| {
                let copy = self.copies.get(&entry.copy_id)?;
                keep(entry, copy).then(|| OpenLoan::from_parts(entry, copy))
            })
            .collect();
        loans.sort_by_key(|loan| loan.borrowed_at);
        loans
    }
}

#[derive(Clone, Default)]
pub struct InMemoryLendingStore {
    state: Arc<Mutex<LendingState>>,
}

impl InMemoryLendingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogRepository for InMemoryLendingStore {
    async fn add_copy(&self, copy: &BookCopy) -> LendingResult<()> {
        let mut state = self.state.lock().await;
        if state.copies.contains_key(&copy.copy_id) {
            return Err(LendingError::Internal(format!(
                "copy {} already exists",
                copy.copy_id
            )));
        }
        state.copies.insert(copy.copy_id, copy.clone());
        Ok(())
    }

    async fn find_copy(&self, copy_id: CopyId) -> LendingResult<Option<BookCopy>> {
        Ok(self.state.lock().await.copies.get(&copy_id).cloned())
    }

    async fn list_copies(&self, query: &CatalogQuery) -> LendingResult<Vec<BookCopy>> {
        let state = self.state.lock().await;
        Ok(state
            .copies
            .values()
            .filter(|copy| query.matches(copy))
            .cloned()
            .collect())
    }
}

impl LedgerRepository for InMemoryLendingStore {
    async fn open_loans_for(&self, account: &str) -> LendingResult<Vec<OpenLoan>> {
        let state = self.state.lock().await;
        Ok(state.open_loans(|entry, _| entry.account == account))
    }

    async fn overdue_loans(&self, now: DateTime<Utc>) -> LendingResult<Vec<OpenLoan>> {
        let state = self.state.lock().await;
        let mut loans = state.open_loans(|_, copy| copy.due_date.is_some_and(|due| due < now));
        loans.sort_by(|a, b| {
            (a.due_date, &a.account, a.copy_id).cmp(&(b.due_date, &b.account, b.copy_id))
        });
        Ok(loans)
    }

    async fn history(&self, account: &str) -> LendingResult<Vec<LedgerEntry>> {
        let state = self.state.lock().await;
        let mut entries: Vec<LedgerEntry> = state
            .ledger
            .iter()
            .filter(|entry| entry.account == account)
            .cloned()
            .collect();
        // Stable sort keeps append order for equal timestamps; reverse for newest first
        entries.sort_by_key(|entry| entry.occurred_at());
        entries.reverse();
        Ok(entries)
    }
}

impl LendingUnitOfWork for InMemoryLendingStore {
    type Tx = InMemoryLendingTx;

    async fn begin(&self) -> LendingResult<InMemoryLendingTx> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(InMemoryLendingTx { guard, staged })
    }
}

pub struct InMemoryLendingTx {
    guard: OwnedMutexGuard<LendingState>,
    staged: LendingState,
}

impl LendingTx for InMemoryLendingTx {
    async fn lock_account(&mut self, _account: &str) -> LendingResult<()> {
        // The store-wide guard already serialises every transaction
        Ok(())
    }

    async fn count_open_borrows(&mut self, account: &str) -> LendingResult<u32> {
        let count = self
            .staged
            .ledger
            .iter()
            .filter(|entry| entry.account == account && entry.is_open_borrow())
            .count();
        Ok(count as u32)
    }

    async fn lock_copy(&mut self, copy_id: CopyId) -> LendingResult<Option<BookCopy>> {
        Ok(self.staged.copies.get(&copy_id).cloned())
    }

    async fn check_out(&mut self, copy_id: CopyId, due_date: DateTime<Utc>) -> LendingResult<bool> {
        match self.staged.copies.get_mut(&copy_id) {
            Some(copy) if copy.available => {
                copy.check_out(due_date);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn check_in(&mut self, copy_id: CopyId) -> LendingResult<()> {
        let copy = self
            .staged
            .copies
            .get_mut(&copy_id)
            .ok_or(LendingError::CopyNotFound)?;
        copy.check_in();
        Ok(())
    }

    async fn find_open_borrow(
        &mut self,
        account: &str,
        copy_id: CopyId,
    ) -> LendingResult<Option<LedgerEntry>> {
        Ok(self
            .staged
            .ledger
            .iter()
            .filter(|e| e.account == account && e.copy_id == copy_id && e.is_open_borrow())
            .max_by_key(|e| e.borrowed_at)
            .cloned())
    }

    async fn close_borrow(&mut self, loan_id: LoanId, returned_at: DateTime<Utc>) -> LendingResult<()> {
        let entry = self
            .staged
            .ledger
            .iter_mut()
            .find(|e| e.loan_id == loan_id && e.is_open_borrow())
            .ok_or(LendingError::NothingToReturn)?;
        entry.returned_at = Some(returned_at);
        Ok(())
    }

    async fn append_entry(&mut self, entry: &LedgerEntry) -> LendingResult<()> {
        let duplicate_open = entry.action == LedgerAction::Borrow
            && self
                .staged
                .ledger
                .iter()
                .any(|e| e.copy_id == entry.copy_id && e.is_open_borrow());
        if duplicate_open {
            return Err(LendingError::AlreadyBorrowed);
        }
        self.staged.ledger.push(entry.clone());
        Ok(())
    }

    async fn commit(mut self) -> LendingResult<()> {
        *self.guard = std::mem::take(&mut self.staged);
        Ok(())
    }
}
