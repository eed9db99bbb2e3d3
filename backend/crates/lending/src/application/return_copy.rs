//! Return Use Case

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::clock::Clock;
use kernel::identity::Identity;

use crate::application::require_reader;
use crate::domain::entities::{CopyId, LedgerEntry};
use crate::domain::repository::{LendingTx, LendingUnitOfWork};
use crate::error::{LendingError, LendingResult};

/// Output DTO for return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub copy_id: CopyId,
    pub returned_at: DateTime<Utc>,
    pub was_overdue: bool,
}

/// Return Use Case
pub struct ReturnUseCase<U>
where
    U: LendingUnitOfWork,
{
    store: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<U> ReturnUseCase<U>
where
    U: LendingUnitOfWork,
{
    pub fn new(store: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn execute(&self, identity: &Identity, copy_id: CopyId) -> LendingResult<ReturnReceipt> {
        require_reader(identity)?;
        let account = identity.username.as_str();
        let now = self.clock.now();

        let mut tx = self.store.begin().await?;
        tx.lock_account(account).await?;

        let open = tx
            .find_open_borrow(account, copy_id)
            .await?
            .ok_or(LendingError::NothingToReturn)?;
        let copy = tx
            .lock_copy(copy_id)
            .await?
            .ok_or(LendingError::CopyNotFound)?;
        let was_overdue = copy.due_date.is_some_and(|due| due < now);

        tx.close_borrow(open.loan_id, now).await?;
        tx.append_entry(&LedgerEntry::return_of(&open, now)).await?;
        tx.check_in(copy_id).await?;
        tx.commit().await?;

        tracing::info!(account, copy_id, loan_id = %open.loan_id, was_overdue, "Copy returned");

        Ok(ReturnReceipt {
            copy_id,
            returned_at: now,
            was_overdue,
        })
    }
}
