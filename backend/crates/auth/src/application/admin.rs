//! Account Administration Use Cases
//!
//! Librarian-only operations on other accounts. The primary administrator
//! and the acting librarian's own account are off limits.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::clock::Clock;
use kernel::identity::{Identity, Role};
use platform::password::{ClearTextPassword, PasswordHasher};
use serde::Serialize;

use crate::application::config::AuthConfig;
use crate::domain::entity::Account;
use crate::domain::repository::{AccountRepository, AccountTx, AccountUnitOfWork};
use crate::domain::value_object::{AccountName, AccountState, PROTECTED_ACCOUNT};
use crate::error::{AuthError, AuthResult};

/// Admin view of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub username: String,
    pub role: Role,
    pub failed_attempts: u16,
    pub state: AccountState,
    pub password_set_at: Option<DateTime<Utc>>,
}

pub struct AccountAdminUseCase<R>
where
    R: AccountRepository + AccountUnitOfWork,
{
    repo: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    config: Arc<AuthConfig>,
}

impl<R> AccountAdminUseCase<R>
where
    R: AccountRepository + AccountUnitOfWork,
{
    pub fn new(
        repo: Arc<R>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            repo,
            hasher,
            clock,
            config,
        }
    }

    /// Assign a new password to another account and lift any lockout
    pub async fn reset_password(
        &self,
        acting: &Identity,
        target: &str,
        new_password: String,
    ) -> AuthResult<()> {
        require_librarian(acting)?;
        let target = AccountName::new(target).map_err(|_| AuthError::NoSuchAccount)?;
        guard_target(acting, &target, "reset")?;

        let password = ClearTextPassword::new(new_password)?;
        let hash = self.hasher.hash(&password)?;

        let mut tx = self.repo.begin().await?;
        let mut account = tx
            .lock_account(&target)
            .await?
            .ok_or(AuthError::NoSuchAccount)?;
        account.assign_password(hash, self.clock.now());
        tx.save(&account).await?;
        tx.commit().await?;

        tracing::info!(by = %acting.username, account = %account.name, "Password reset");
        Ok(())
    }

    pub async fn create_account(
        &self,
        acting: &Identity,
        username: &str,
        password: String,
        role: Role,
    ) -> AuthResult<AccountSummary> {
        require_librarian(acting)?;
        let name = AccountName::new(username)?;
        let password = ClearTextPassword::new(password)?;
        let hash = self.hasher.hash(&password)?;

        let account = Account::new(name, hash, role, self.clock.now());
        self.repo.create(&account).await?;

        tracing::info!(by = %acting.username, account = %account.name, %role, "Account created");
        Ok(self.summarize(&account))
    }

    pub async fn delete_account(&self, acting: &Identity, target: &str) -> AuthResult<()> {
        require_librarian(acting)?;
        let target = AccountName::new(target).map_err(|_| AuthError::NoSuchAccount)?;
        guard_target(acting, &target, "delete")?;

        if !self.repo.delete(&target).await? {
            return Err(AuthError::NoSuchAccount);
        }

        tracing::info!(by = %acting.username, account = %target, "Account deleted");
        Ok(())
    }

    /// Derived login state of one account
    pub async fn account_state(&self, acting: &Identity, target: &str) -> AuthResult<AccountSummary> {
        require_librarian(acting)?;
        let target = AccountName::new(target).map_err(|_| AuthError::NoSuchAccount)?;
        let account = self
            .repo
            .find_by_name(&target)
            .await?
            .ok_or(AuthError::NoSuchAccount)?;
        Ok(self.summarize(&account))
    }

    pub async fn list_accounts(&self, acting: &Identity) -> AuthResult<Vec<AccountSummary>> {
        require_librarian(acting)?;
        let accounts = self.repo.list().await?;
        Ok(accounts.iter().map(|a| self.summarize(a)).collect())
    }

    /// Create the primary administrator when it does not exist yet.
    ///
    /// Returns `true` when an account was created.
    pub async fn ensure_primary_admin(&self, password: String) -> AuthResult<bool> {
        let name = AccountName::new(PROTECTED_ACCOUNT)?;
        if self.repo.find_by_name(&name).await?.is_some() {
            return Ok(false);
        }

        let password = ClearTextPassword::new(password)?;
        let hash = self.hasher.hash(&password)?;
        let account = Account::new(name, hash, Role::Librarian, self.clock.now());
        match self.repo.create(&account).await {
            Ok(()) => {
                tracing::info!("Primary administrator account created");
                Ok(true)
            }
            // Another instance won the race
            Err(AuthError::UsernameTaken) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn summarize(&self, account: &Account) -> AccountSummary {
        AccountSummary {
            username: account.name.original().to_string(),
            role: account.role,
            failed_attempts: account.failed_attempts,
            state: account.state(self.clock.now(), self.config.password_max_age),
            password_set_at: account.password_set_at,
        }
    }
}

fn require_librarian(acting: &Identity) -> AuthResult<()> {
    if acting.is_librarian() {
        Ok(())
    } else {
        Err(AuthError::Unauthorized)
    }
}

fn guard_target(acting: &Identity, target: &AccountName, action: &'static str) -> AuthResult<()> {
    if target.is_protected() {
        tracing::warn!(by = %acting.username, action, "Attempt on primary administrator");
        return Err(AuthError::Forbidden(
            "The primary administrator account cannot be modified.",
        ));
    }
    if target.canonical() == acting.username.to_lowercase() {
        return Err(AuthError::Forbidden(
            "Use the change password form for your own account.",
        ));
    }
    Ok(())
}
