//! Login Use Case
//!
//! The login state machine: lockout checks, credential + role check,
//! failure counting and password-age evaluation.

use std::sync::Arc;

use kernel::clock::Clock;
use kernel::identity::{Identity, Role};
use platform::password::{ClearTextPassword, PasswordHasher};

use crate::application::config::AuthConfig;
use crate::domain::repository::{AccountTx, AccountUnitOfWork};
use crate::domain::value_object::{AccountName, Lockout};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub username: String,
    pub password: String,
    /// Role the caller says they hold; must equal the stored role
    pub role: Role,
}

/// Successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(Identity),
    /// Credentials were right but a librarian must rotate their password
    MustChangePassword(Identity),
}

impl LoginOutcome {
    pub fn identity(&self) -> &Identity {
        match self {
            LoginOutcome::Authenticated(identity) | LoginOutcome::MustChangePassword(identity) => {
                identity
            }
        }
    }
}

/// Login use case
pub struct LoginUseCase<R>
where
    R: AccountUnitOfWork,
{
    repo: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    config: Arc<AuthConfig>,
}

impl<R> LoginUseCase<R>
where
    R: AccountUnitOfWork,
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

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutcome> {
        // A name that can never exist is reported like any unknown account
        let name = AccountName::new(&input.username).map_err(|_| AuthError::AccountNotFound)?;
        let password = ClearTextPassword::for_verification(input.password);
        let now = self.clock.now();

        let mut tx = self.repo.begin().await?;
        let mut account = tx
            .lock_account(&name)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        match account.lockout {
            Some(lockout) if lockout.is_expired(now) => {
                account.clear_failures(now);
                tracing::info!(account = %account.name, "Lockout window elapsed, cleared");
            }
            Some(lockout) => {
                // Dropping `tx` leaves the stored state untouched
                return Err(AuthError::AccountLocked {
                    remaining_minutes: lockout.remaining_minutes(now),
                });
            }
            None => {}
        }

        let password_ok = self.hasher.verify(&password, &account.password_hash);
        if !password_ok || account.role != input.role {
            let attempts = account.record_failure(
                now,
                self.config.max_attempts,
                self.config.lockout_duration,
            );
            tx.save(&account).await?;
            tx.commit().await?;

            if let Some(lockout) = account.lockout {
                tracing::warn!(
                    account = %account.name,
                    attempts,
                    indefinite = matches!(lockout, Lockout::Indefinite),
                    "Account locked after failed logins"
                );
            }
            return Err(AuthError::InvalidCredentials { attempts });
        }

        account.clear_failures(now);
        tx.save(&account).await?;
        tx.commit().await?;

        let identity = Identity::new(account.name.canonical(), account.role);
        if account.password_expired(now, self.config.password_max_age) {
            tracing::info!(account = %account.name, "Password rotation required");
            return Ok(LoginOutcome::MustChangePassword(identity));
        }

        tracing::info!(account = %account.name, role = %account.role, "Logged in");
        Ok(LoginOutcome::Authenticated(identity))
    }
}
