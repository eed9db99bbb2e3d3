//! Account Entity
//!
//! Credentials, role and login-failure tracking for one library account.

use chrono::{DateTime, Duration, Utc};
use platform::password::HashedPassword;

use crate::domain::value_object::{AccountName, AccountState, Lockout, Role};

/// Account entity
///
/// Invariant: `lockout.is_some()` implies `failed_attempts` reached the
/// policy maximum when the lockout was applied.
#[derive(Debug, Clone)]
pub struct Account {
    pub name: AccountName,
    pub password_hash: HashedPassword,
    pub role: Role,
    /// Consecutive failed logins since the last success or reset
    pub failed_attempts: u16,
    pub lockout: Option<Lockout>,
    /// When the holder last chose their own password. `None` after an
    /// administrative assignment.
    pub password_set_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// New account with an administrator-assigned password
    pub fn new(name: AccountName, password_hash: HashedPassword, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            name,
            password_hash,
            role,
            failed_attempts: 0,
            lockout: None,
            password_set_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derived state; never stored.
    pub fn state(&self, now: DateTime<Utc>, password_max_age: Duration) -> AccountState {
        match self.lockout {
            Some(Lockout::Indefinite) => AccountState::PermanentlyLocked,
            Some(Lockout::Until(until)) if until > now => AccountState::TemporarilyLocked { until },
            _ if self.password_expired(now, password_max_age) => AccountState::PasswordExpired,
            _ => AccountState::Active,
        }
    }

    /// Only librarians rotate passwords. A missing timestamp counts as expired.
    pub fn password_expired(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        if self.role != Role::Librarian {
            return false;
        }
        match self.password_set_at {
            Some(set_at) => now - set_at > max_age,
            None => true,
        }
    }

    /// Count one failed login and lock the account when the limit is reached.
    ///
    /// Returns the new attempt count.
    pub fn record_failure(&mut self, now: DateTime<Utc>, max_attempts: u16, lockout_for: Duration) -> u16 {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        if self.failed_attempts >= max_attempts {
            self.lockout = Some(match self.role {
                Role::Librarian => Lockout::Indefinite,
                Role::Reader => Lockout::Until(now + lockout_for),
            });
        }
        self.updated_at = now;
        self.failed_attempts
    }

    pub fn clear_failures(&mut self, now: DateTime<Utc>) {
        self.failed_attempts = 0;
        self.lockout = None;
        self.updated_at = now;
    }

    /// Password chosen by the holder
    pub fn change_password(&mut self, password_hash: HashedPassword, now: DateTime<Utc>) {
        self.password_hash = password_hash;
        self.password_set_at = Some(now);
        self.clear_failures(now);
    }

    /// Password assigned by a librarian; must be rotated by a librarian holder
    pub fn assign_password(&mut self, password_hash: HashedPassword, now: DateTime<Utc>) {
        self.password_hash = password_hash;
        self.password_set_at = None;
        self.clear_failures(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use platform::password::{Argon2Config, Argon2Hasher, ClearTextPassword, PasswordHasher};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap()
    }

    fn account(role: Role) -> Account {
        let hasher = Argon2Hasher::new(Argon2Config::development()).unwrap();
        let hash = hasher
            .hash(&ClearTextPassword::for_verification("initial-pass".to_string()))
            .unwrap();
        Account::new(AccountName::new("alice").unwrap(), hash, role, t0())
    }

    #[test]
    fn reader_locks_for_a_window() {
        let mut acc = account(Role::Reader);
        assert_eq!(acc.record_failure(t0(), 3, Duration::minutes(3)), 1);
        assert_eq!(acc.record_failure(t0(), 3, Duration::minutes(3)), 2);
        assert!(acc.lockout.is_none());

        assert_eq!(acc.record_failure(t0(), 3, Duration::minutes(3)), 3);
        assert_eq!(acc.lockout, Some(Lockout::Until(t0() + Duration::minutes(3))));
        assert_eq!(
            acc.state(t0(), Duration::days(180)),
            AccountState::TemporarilyLocked { until: t0() + Duration::minutes(3) }
        );
        assert_eq!(acc.state(t0() + Duration::minutes(3), Duration::days(180)), AccountState::Active);
    }

    #[test]
    fn librarian_locks_indefinitely() {
        let mut acc = account(Role::Librarian);
        for _ in 0..3 {
            acc.record_failure(t0(), 3, Duration::minutes(3));
        }
        assert_eq!(acc.lockout, Some(Lockout::Indefinite));
        assert_eq!(
            acc.state(t0() + Duration::days(365), Duration::days(180)),
            AccountState::PermanentlyLocked
        );
    }

    #[test]
    fn librarian_password_expiry() {
        let mut acc = account(Role::Librarian);
        let max_age = Duration::days(180);
        assert!(acc.password_expired(t0(), max_age));

        let hash = acc.password_hash.clone();
        acc.change_password(hash, t0());
        assert!(!acc.password_expired(t0() + Duration::days(180), max_age));
        assert!(acc.password_expired(t0() + Duration::days(181), max_age));
        assert_eq!(acc.state(t0() + Duration::days(181), max_age), AccountState::PasswordExpired);
    }

    #[test]
    fn readers_never_expire() {
        let acc = account(Role::Reader);
        assert!(!acc.password_expired(t0() + Duration::days(1000), Duration::days(180)));
    }

    #[test]
    fn assign_password_clears_lockout_and_age() {
        let mut acc = account(Role::Librarian);
        for _ in 0..3 {
            acc.record_failure(t0(), 3, Duration::minutes(3));
        }
        let hash = acc.password_hash.clone();
        acc.assign_password(hash, t0());
        assert_eq!(acc.failed_attempts, 0);
        assert!(acc.lockout.is_none());
        assert!(acc.password_set_at.is_none());
    }
}
