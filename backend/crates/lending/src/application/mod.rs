//! Application Layer - Use cases
//!
//! Borrow and return run inside one lending transaction each; the queries
//! read committed state only.

pub mod borrow;
pub mod config;
pub mod queries;
pub mod return_copy;

use kernel::identity::Identity;

use crate::error::{LendingError, LendingResult};

pub use borrow::{BorrowReceipt, BorrowUseCase};
pub use config::LendingConfig;
pub use queries::{LendingQueries, LoanView};
pub use return_copy::{ReturnReceipt, ReturnUseCase};

/// Borrowing is for readers only
fn require_reader(identity: &Identity) -> LendingResult<()> {
    if identity.is_reader() {
        Ok(())
    } else {
        Err(LendingError::Unauthorized)
    }
}
