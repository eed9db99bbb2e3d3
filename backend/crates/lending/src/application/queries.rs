//! Read-only lending queries

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::clock::Clock;
use kernel::id::LoanId;
use kernel::identity::Identity;
use serde::Serialize;

use crate::application::require_reader;
use crate::domain::entities::{BookCopy, CopyId, LedgerEntry, OpenLoan};
use crate::domain::repository::{CatalogRepository, LedgerRepository};
use crate::domain::value_objects::CatalogQuery;
use crate::error::{LendingError, LendingResult};

/// One open borrow as seen by its holder or a librarian
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub loan_id: LoanId,
    pub account: String,
    pub copy_id: CopyId,
    pub title: String,
    pub author: String,
    pub borrowed_at: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub is_overdue: bool,
}

impl LoanView {
    fn at(loan: OpenLoan, now: DateTime<Utc>) -> Self {
        let is_overdue = loan.is_overdue(now);
        Self {
            loan_id: loan.loan_id,
            account: loan.account,
            copy_id: loan.copy_id,
            title: loan.title,
            author: loan.author,
            borrowed_at: loan.borrowed_at,
            due_date: loan.due_date,
            is_overdue,
        }
    }
}

pub struct LendingQueries<S>
where
    S: CatalogRepository + LedgerRepository,
{
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> LendingQueries<S>
where
    S: CatalogRepository + LedgerRepository,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Filtered catalog, ordered by copy id
    pub async fn list_catalog(&self, query: &CatalogQuery) -> LendingResult<Vec<BookCopy>> {
        self.store.list_copies(query).await
    }

    pub async fn list_my_borrowed(&self, identity: &Identity) -> LendingResult<Vec<LoanView>> {
        require_reader(identity)?;
        let now = self.clock.now();
        let loans = self.store.open_loans_for(&identity.username).await?;
        Ok(loans.into_iter().map(|loan| LoanView::at(loan, now)).collect())
    }

    /// Librarian report of every overdue open borrow
    pub async fn list_overdue(&self, identity: &Identity) -> LendingResult<Vec<LoanView>> {
        if !identity.is_librarian() {
            return Err(LendingError::Unauthorized);
        }
        let now = self.clock.now();
        let loans = self.store.overdue_loans(now).await?;
        Ok(loans.into_iter().map(|loan| LoanView::at(loan, now)).collect())
    }

    pub async fn history(&self, identity: &Identity) -> LendingResult<Vec<LedgerEntry>> {
        require_reader(identity)?;
        self.store.history(&identity.username).await
    }
}
