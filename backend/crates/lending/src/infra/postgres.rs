//! PostgreSQL Repository Implementations
//!
//! Lending transactions take a transaction-scoped advisory lock on the
//! account, row locks on the copy, and a conditional availability update.
//! The partial unique index `ledger_one_open_borrow_per_copy` backs all of
//! them.

use chrono::{DateTime, Utc};
use kernel::id::LoanId;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::domain::entities::{BookCopy, CopyId, LedgerAction, LedgerEntry, OpenLoan};
use crate::domain::repository::{
    CatalogRepository, LedgerRepository, LendingTx, LendingUnitOfWork,
};
use crate::domain::value_objects::CatalogQuery;
use crate::error::{LendingError, LendingResult};

const COPY_COLUMNS: &str = "copy_id, title, author, category, available, due_date";

const LEDGER_COLUMNS: &str = "loan_id, account, copy_id, action, borrowed_at, returned_at";

const OPEN_LOAN_SELECT: &str = r#"
    SELECT l.loan_id, l.account, c.copy_id, c.title, c.author, l.borrowed_at, c.due_date
    FROM ledger l
    JOIN copies c ON c.copy_id = l.copy_id
    WHERE l.action = 'borrow' AND l.returned_at IS NULL
"#;

/// PostgreSQL-backed lending store
#[derive(Clone)]
pub struct PgLendingRepository {
    pool: PgPool,
}

impl PgLendingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for PgLendingRepository {
    async fn add_copy(&self, copy: &BookCopy) -> LendingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO copies (copy_id, title, author, category, available, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(copy.copy_id)
        .bind(&copy.title)
        .bind(&copy.author)
        .bind(&copy.category)
        .bind(copy.available)
        .bind(copy.due_date)
        .execute(&self.pool)
        .await?;

        tracing::info!(copy_id = copy.copy_id, title = %copy.title, "Copy added");
        Ok(())
    }

    async fn find_copy(&self, copy_id: CopyId) -> LendingResult<Option<BookCopy>> {
        let row = sqlx::query_as::<_, CopyRow>(&format!(
            "SELECT {COPY_COLUMNS} FROM copies WHERE copy_id = $1"
        ))
        .bind(copy_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CopyRow::into_copy))
    }

    async fn list_copies(&self, query: &CatalogQuery) -> LendingResult<Vec<BookCopy>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COPY_COLUMNS} FROM copies WHERE TRUE"));

        if let Some(pattern) = query.like_pattern() {
            builder
                .push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR author ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category) = query.category() {
            builder.push(" AND category = ").push_bind(category.to_string());
        }
        builder.push(" ORDER BY copy_id");

        let rows = builder
            .build_query_as::<CopyRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(CopyRow::into_copy).collect())
    }
}

impl LedgerRepository for PgLendingRepository {
    async fn open_loans_for(&self, account: &str) -> LendingResult<Vec<OpenLoan>> {
        let rows = sqlx::query_as::<_, OpenLoanRow>(&format!(
            "{OPEN_LOAN_SELECT} AND l.account = $1 ORDER BY l.borrowed_at"
        ))
        .bind(account)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OpenLoanRow::into_open_loan).collect())
    }

    async fn overdue_loans(&self, now: DateTime<Utc>) -> LendingResult<Vec<OpenLoan>> {
        let rows = sqlx::query_as::<_, OpenLoanRow>(&format!(
            "{OPEN_LOAN_SELECT} AND c.due_date < $1 ORDER BY c.due_date, l.account, c.copy_id"
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OpenLoanRow::into_open_loan).collect())
    }

    async fn history(&self, account: &str) -> LendingResult<Vec<LedgerEntry>> {
        let rows = sqlx::query_as::<_, LedgerRow>(&format!(
            r#"
            SELECT {LEDGER_COLUMNS} FROM ledger
            WHERE account = $1
            ORDER BY COALESCE(returned_at, borrowed_at) DESC, recorded_seq DESC
            "#
        ))
        .bind(account)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LedgerRow::into_entry).collect()
    }
}

impl LendingUnitOfWork for PgLendingRepository {
    type Tx = PgLendingTx;

    async fn begin(&self) -> LendingResult<PgLendingTx> {
        Ok(PgLendingTx {
            tx: self.pool.begin().await?,
        })
    }
}

/// One lending transaction. Dropped without `commit` it rolls back.
pub struct PgLendingTx {
    tx: Transaction<'static, Postgres>,
}

impl LendingTx for PgLendingTx {
    async fn lock_account(&mut self, account: &str) -> LendingResult<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(account)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn count_open_borrows(&mut self, account: &str) -> LendingResult<u32> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM ledger
            WHERE account = $1 AND action = 'borrow' AND returned_at IS NULL
            "#,
        )
        .bind(account)
        .fetch_one(&mut *self.tx)
        .await?;

        u32::try_from(count).map_err(|_| LendingError::Internal(format!("bad count {count}")))
    }

    async fn lock_copy(&mut self, copy_id: CopyId) -> LendingResult<Option<BookCopy>> {
        let row = sqlx::query_as::<_, CopyRow>(&format!(
            "SELECT {COPY_COLUMNS} FROM copies WHERE copy_id = $1 FOR UPDATE"
        ))
        .bind(copy_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(CopyRow::into_copy))
    }

    async fn check_out(&mut self, copy_id: CopyId, due_date: DateTime<Utc>) -> LendingResult<bool> {
        let affected = sqlx::query(
            r#"
            UPDATE copies SET available = FALSE, due_date = $2
            WHERE copy_id = $1 AND available
            "#,
        )
        .bind(copy_id)
        .bind(due_date)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        Ok(affected == 1)
    }

    async fn check_in(&mut self, copy_id: CopyId) -> LendingResult<()> {
        let affected = sqlx::query(
            "UPDATE copies SET available = TRUE, due_date = NULL WHERE copy_id = $1",
        )
        .bind(copy_id)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(LendingError::CopyNotFound);
        }
        Ok(())
    }

    async fn find_open_borrow(
        &mut self,
        account: &str,
        copy_id: CopyId,
    ) -> LendingResult<Option<LedgerEntry>> {
        let row = sqlx::query_as::<_, LedgerRow>(&format!(
            r#"
            SELECT {LEDGER_COLUMNS} FROM ledger
            WHERE account = $1 AND copy_id = $2
              AND action = 'borrow' AND returned_at IS NULL
            ORDER BY borrowed_at DESC
            LIMIT 1
            FOR UPDATE
            "#
        ))
        .bind(account)
        .bind(copy_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(LedgerRow::into_entry).transpose()
    }

    async fn close_borrow(&mut self, loan_id: LoanId, returned_at: DateTime<Utc>) -> LendingResult<()> {
        let affected = sqlx::query(
            r#"
            UPDATE ledger SET returned_at = $2
            WHERE loan_id = $1 AND action = 'borrow' AND returned_at IS NULL
            "#,
        )
        .bind(loan_id.into_uuid())
        .bind(returned_at)
        .execute(&mut *self.tx)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(LendingError::NothingToReturn);
        }
        Ok(())
    }

    async fn append_entry(&mut self, entry: &LedgerEntry) -> LendingResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO ledger (loan_id, account, copy_id, action, borrowed_at, returned_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.loan_id.into_uuid())
        .bind(&entry.account)
        .bind(entry.copy_id)
        .bind(entry.action.as_str())
        .bind(entry.borrowed_at)
        .bind(entry.returned_at)
        .execute(&mut *self.tx)
        .await;

        match result {
            Ok(_) => Ok(()),
            // Partial unique index: the copy already has an open borrow
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(LendingError::AlreadyBorrowed)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn commit(self) -> LendingResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct CopyRow {
    copy_id: i64,
    title: String,
    author: String,
    category: String,
    available: bool,
    due_date: Option<DateTime<Utc>>,
}

impl CopyRow {
    fn into_copy(self) -> BookCopy {
        BookCopy {
            copy_id: self.copy_id,
            title: self.title,
            author: self.author,
            category: self.category,
            available: self.available,
            due_date: self.due_date,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LedgerRow {
    loan_id: Uuid,
    account: String,
    copy_id: i64,
    action: String,
    borrowed_at: DateTime<Utc>,
    returned_at: Option<DateTime<Utc>>,
}

impl LedgerRow {
    fn into_entry(self) -> LendingResult<LedgerEntry> {
        let action: LedgerAction = self
            .action
            .parse()
            .map_err(|e| LendingError::Internal(format!("{e}")))?;
        Ok(LedgerEntry {
            loan_id: LoanId::from_uuid(self.loan_id),
            account: self.account,
            copy_id: self.copy_id,
            action,
            borrowed_at: self.borrowed_at,
            returned_at: self.returned_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OpenLoanRow {
    loan_id: Uuid,
    account: String,
    copy_id: i64,
    title: String,
    author: String,
    borrowed_at: DateTime<Utc>,
    due_date: Option<DateTime<Utc>>,
}

impl OpenLoanRow {
    fn into_open_loan(self) -> OpenLoan {
        OpenLoan {
            loan_id: LoanId::from_uuid(self.loan_id),
            account: self.account,
            copy_id: self.copy_id,
            title: self.title,
            author: self.author,
            borrowed_at: self.borrowed_at,
            due_date: self.due_date,
        }
    }
}
