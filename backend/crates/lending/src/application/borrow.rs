//! Borrow Use Case

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::clock::Clock;
use kernel::id::LoanId;
use kernel::identity::Identity;

use crate::application::config::LendingConfig;
use crate::application::require_reader;
use crate::domain::entities::{CopyId, LedgerEntry};
use crate::domain::repository::{LendingTx, LendingUnitOfWork};
use crate::error::{LendingError, LendingResult};

/// Output DTO for borrow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowReceipt {
    pub copy_id: CopyId,
    pub due_date: DateTime<Utc>,
    pub loan_id: LoanId,
}

/// Borrow Use Case
pub struct BorrowUseCase<U>
where
    U: LendingUnitOfWork,
{
    store: Arc<U>,
    clock: Arc<dyn Clock>,
    config: Arc<LendingConfig>,
}

impl<U> BorrowUseCase<U>
where
    U: LendingUnitOfWork,
{
    pub fn new(store: Arc<U>, clock: Arc<dyn Clock>, config: Arc<LendingConfig>) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub async fn execute(&self, identity: &Identity, copy_id: CopyId) -> LendingResult<BorrowReceipt> {
        require_reader(identity)?;
        let account = identity.username.as_str();
        let now = self.clock.now();

        let mut tx = self.store.begin().await?;
        tx.lock_account(account).await?;

        let open = tx.count_open_borrows(account).await?;
        if open >= self.config.max_borrow_limit {
            tracing::info!(account, open, "Borrow limit reached");
            return Err(LendingError::LimitReached { count: open });
        }

        let copy = tx
            .lock_copy(copy_id)
            .await?
            .ok_or(LendingError::CopyNotFound)?;
        if !copy.available {
            return Err(LendingError::AlreadyBorrowed);
        }

        let due_date = now + self.config.loan_period;
        if !tx.check_out(copy_id, due_date).await? {
            tracing::warn!(account, copy_id, "Lost checkout race");
            return Err(LendingError::AlreadyBorrowed);
        }

        let entry = LedgerEntry::borrow(account, copy_id, now);
        tx.append_entry(&entry).await?;
        tx.commit().await?;

        tracing::info!(account, copy_id, loan_id = %entry.loan_id, %due_date, "Copy borrowed");

        Ok(BorrowReceipt {
            copy_id,
            due_date,
            loan_id: entry.loan_id,
        })
    }
}
