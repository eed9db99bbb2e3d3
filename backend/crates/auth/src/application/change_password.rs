//! Change Password Use Case
//!
//! Voluntary or forced rotation by the account holder. Never time-gated.

use std::sync::Arc;

use kernel::clock::Clock;
use kernel::identity::Identity;
use platform::password::{ClearTextPassword, PasswordHasher};

use crate::domain::repository::{AccountTx, AccountUnitOfWork};
use crate::domain::value_object::AccountName;
use crate::error::{AuthError, AuthResult};

pub struct ChangePasswordUseCase<R>
where
    R: AccountUnitOfWork,
{
    repo: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl<R> ChangePasswordUseCase<R>
where
    R: AccountUnitOfWork,
{
    pub fn new(repo: Arc<R>, hasher: Arc<dyn PasswordHasher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            hasher,
            clock,
        }
    }

    /// Store a new password for the caller's own account
    pub async fn execute(&self, identity: &Identity, new_password: String) -> AuthResult<()> {
        let password = ClearTextPassword::new(new_password)?;
        let hash = self.hasher.hash(&password)?;
        let name = AccountName::from_db(identity.username.as_str());

        let mut tx = self.repo.begin().await?;
        let mut account = tx
            .lock_account(&name)
            .await?
            .ok_or(AuthError::NoSuchAccount)?;

        account.change_password(hash, self.clock.now());
        tx.save(&account).await?;
        tx.commit().await?;

        tracing::info!(account = %account.name, "Password changed");
        Ok(())
    }
}
