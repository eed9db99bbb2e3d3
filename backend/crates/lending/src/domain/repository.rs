//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::LoanId;

use crate::domain::entities::{BookCopy, CopyId, LedgerEntry, OpenLoan};
use crate::domain::value_objects::CatalogQuery;
use crate::error::LendingResult;

/// Catalog of copies
#[trait_variant::make(CatalogRepository: Send)]
pub trait LocalCatalogRepository {
    /// Put a new copy on the shelf
    async fn add_copy(&self, copy: &BookCopy) -> LendingResult<()>;

    async fn find_copy(&self, copy_id: CopyId) -> LendingResult<Option<BookCopy>>;

    /// Matching copies ordered by copy id
    async fn list_copies(&self, query: &CatalogQuery) -> LendingResult<Vec<BookCopy>>;
}

/// Read side of the loan ledger
#[trait_variant::make(LedgerRepository: Send)]
pub trait LocalLedgerRepository {
    /// Open borrows of one account, oldest first
    async fn open_loans_for(&self, account: &str) -> LendingResult<Vec<OpenLoan>>;

    /// Open borrows of every account whose due date is before `now`,
    /// longest overdue first, then by account and copy id
    async fn overdue_loans(&self, now: DateTime<Utc>) -> LendingResult<Vec<OpenLoan>>;

    /// Every ledger event of one account, newest first
    async fn history(&self, account: &str) -> LendingResult<Vec<LedgerEntry>>;
}

/// Opens a transaction scope over copies and the ledger
#[trait_variant::make(LendingUnitOfWork: Send)]
pub trait LocalLendingUnitOfWork {
    type Tx: LendingTx + Send;

    async fn begin(&self) -> LendingResult<Self::Tx>;
}

/// One borrow or return transaction
///
/// Dropping without `commit` discards every staged write.
#[trait_variant::make(LendingTx: Send)]
pub trait LocalLendingTx {
    /// Serialise all lending work of one account until the transaction ends
    async fn lock_account(&mut self, account: &str) -> LendingResult<()>;

    async fn count_open_borrows(&mut self, account: &str) -> LendingResult<u32>;

    /// Read the copy and hold it until the transaction ends
    async fn lock_copy(&mut self, copy_id: CopyId) -> LendingResult<Option<BookCopy>>;

    /// Mark the copy lent if it is still available.
    ///
    /// Returns `false` when another borrower got there first.
    async fn check_out(&mut self, copy_id: CopyId, due_date: DateTime<Utc>) -> LendingResult<bool>;

    async fn check_in(&mut self, copy_id: CopyId) -> LendingResult<()>;

    /// Most recent open borrow of `copy_id` by `account`
    async fn find_open_borrow(
        &mut self,
        account: &str,
        copy_id: CopyId,
    ) -> LendingResult<Option<LedgerEntry>>;

    async fn close_borrow(&mut self, loan_id: LoanId, returned_at: DateTime<Utc>)
    -> LendingResult<()>;

    /// `LendingError::AlreadyBorrowed` if this would open a second borrow of a copy
    async fn append_entry(&mut self, entry: &LedgerEntry) -> LendingResult<()>;

    async fn commit(self) -> LendingResult<()>;
}

/// Everything the HTTP layer needs from one store
pub trait LendingStore:
    CatalogRepository + LedgerRepository + LendingUnitOfWork + Send + Sync + 'static
{
}

impl<T> LendingStore for T where
    T: CatalogRepository + LedgerRepository + LendingUnitOfWork + Send + Sync + 'static
{
}
