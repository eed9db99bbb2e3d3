//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::identity::Role;
use platform::password::HashedPassword;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::entity::Account;
use crate::domain::repository::{AccountRepository, AccountTx, AccountUnitOfWork};
use crate::domain::value_object::{AccountName, Lockout};
use crate::error::{AuthError, AuthResult};

const UNIQUE_VIOLATION: &str = "23505";

const ACCOUNT_COLUMNS: &str = r#"
    username,
    username_canonical,
    password_hash,
    role,
    failed_attempts,
    locked_until,
    locked_indefinitely,
    password_set_at,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed account store
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Account Repository Implementation
// ============================================================================

impl AccountRepository for PgAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let (locked_until, locked_indefinitely) = Lockout::to_columns(account.lockout);

        let result = sqlx::query(
            r#"
            INSERT INTO accounts (
                username,
                username_canonical,
                password_hash,
                role,
                failed_attempts,
                locked_until,
                locked_indefinitely,
                password_set_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(account.name.original())
        .bind(account.name.canonical())
        .bind(account.password_hash.as_phc_string())
        .bind(account.role.id())
        .bind(account.failed_attempts as i16)
        .bind(locked_until)
        .bind(locked_indefinitely)
        .bind(account.password_set_at)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(AuthError::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_name(&self, name: &AccountName) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username_canonical = $1"
        ))
        .bind(name.canonical())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn list(&self) -> AuthResult<Vec<Account>> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY username_canonical"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_account()).collect()
    }

    async fn delete(&self, name: &AccountName) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM accounts WHERE username_canonical = $1")
            .bind(name.canonical())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Unit of Work
// ============================================================================

impl AccountUnitOfWork for PgAccountRepository {
    type Tx = PgAccountTx;

    async fn begin(&self) -> AuthResult<PgAccountTx> {
        Ok(PgAccountTx {
            tx: self.pool.begin().await?,
        })
    }
}

/// Open transaction; rolled back by sqlx when dropped uncommitted
pub struct PgAccountTx {
    tx: Transaction<'static, Postgres>,
}

impl AccountTx for PgAccountTx {
    async fn lock_account(&mut self, name: &AccountName) -> AuthResult<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username_canonical = $1 FOR UPDATE"
        ))
        .bind(name.canonical())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(|r| r.into_account()).transpose()
    }

    async fn save(&mut self, account: &Account) -> AuthResult<()> {
        let (locked_until, locked_indefinitely) = Lockout::to_columns(account.lockout);

        sqlx::query(
            r#"
            UPDATE accounts SET
                password_hash = $2,
                role = $3,
                failed_attempts = $4,
                locked_until = $5,
                locked_indefinitely = $6,
                password_set_at = $7,
                updated_at = $8
            WHERE username_canonical = $1
            "#,
        )
        .bind(account.name.canonical())
        .bind(account.password_hash.as_phc_string())
        .bind(account.role.id())
        .bind(account.failed_attempts as i16)
        .bind(locked_until)
        .bind(locked_indefinitely)
        .bind(account.password_set_at)
        .bind(account.updated_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self) -> AuthResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    username: String,
    #[allow(dead_code)]
    username_canonical: String,
    password_hash: String,
    role: i16,
    failed_attempts: i16,
    locked_until: Option<DateTime<Utc>>,
    locked_indefinitely: bool,
    password_set_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AuthResult<Account> {
        let role = Role::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role id: {}", self.role)))?;
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Account {
            name: AccountName::from_db(self.username),
            password_hash,
            role,
            failed_attempts: self.failed_attempts.max(0) as u16,
            lockout: Lockout::from_columns(self.locked_until, self.locked_indefinitely),
            password_set_at: self.password_set_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
