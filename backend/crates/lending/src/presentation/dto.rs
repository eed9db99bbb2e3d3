//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::id::LoanId;
use kernel::message::MessageCategory;
use serde::{Deserialize, Serialize};

use crate::application::LoanView;
use crate::domain::entities::{BookCopy, CopyId, LedgerEntry};

/// Query string for GET /api/lending/catalog
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogParams {
    /// Title or author fragment
    #[serde(default)]
    pub q: Option<String>,
    /// Exact category, `All` for any
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub copies: Vec<BookCopy>,
}

/// Response for POST /api/lending/copies/{id}/borrow
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowResponse {
    pub copy_id: CopyId,
    pub loan_id: LoanId,
    pub due_date: DateTime<Utc>,
    pub message: String,
    pub category: MessageCategory,
}

/// Response for POST /api/lending/copies/{id}/return
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnResponse {
    pub copy_id: CopyId,
    pub returned_at: DateTime<Utc>,
    pub was_overdue: bool,
    pub message: String,
    pub category: MessageCategory,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoansResponse {
    pub loans: Vec<LoanView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<LedgerEntry>,
}
