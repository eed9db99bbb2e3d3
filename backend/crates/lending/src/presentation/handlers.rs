//! HTTP Handlers
//!
//! Every route here sits behind the identity middleware, which places the
//! caller's `Identity` in the request extensions.

use std::sync::Arc;

use axum::Extension;
use axum::Json;
use axum::extract::{Path, Query, State};
use kernel::clock::Clock;
use kernel::identity::Identity;
use kernel::message::MessageCategory;

use crate::application::{BorrowUseCase, LendingConfig, LendingQueries, ReturnUseCase};
use crate::domain::entities::CopyId;
use crate::domain::repository::LendingStore;
use crate::domain::value_objects::CatalogQuery;
use crate::error::LendingResult;
use crate::presentation::dto::{
    BorrowResponse, CatalogParams, CatalogResponse, HistoryResponse, LoansResponse,
    ReturnResponse,
};

/// Shared state for lending handlers
pub struct LendingAppState<S> {
    pub store: Arc<S>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<LendingConfig>,
}

impl<S> Clone for LendingAppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: self.clock.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S> LendingAppState<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>, config: LendingConfig) -> Self {
        Self {
            store: Arc::new(store),
            clock,
            config: Arc::new(config),
        }
    }
}

impl<S: LendingStore> LendingAppState<S> {
    fn queries(&self) -> LendingQueries<S> {
        LendingQueries::new(self.store.clone(), self.clock.clone())
    }
}

/// GET /api/lending/catalog
pub async fn list_catalog<S: LendingStore>(
    State(state): State<LendingAppState<S>>,
    Query(params): Query<CatalogParams>,
) -> LendingResult<Json<CatalogResponse>> {
    let query = CatalogQuery::new(params.q, params.category);
    let copies = state.queries().list_catalog(&query).await?;
    Ok(Json(CatalogResponse { copies }))
}

/// POST /api/lending/copies/{copy_id}/borrow
pub async fn borrow<S: LendingStore>(
    State(state): State<LendingAppState<S>>,
    Extension(identity): Extension<Identity>,
    Path(copy_id): Path<CopyId>,
) -> LendingResult<Json<BorrowResponse>> {
    let use_case = BorrowUseCase::new(
        state.store.clone(),
        state.clock.clone(),
        state.config.clone(),
    );
    let receipt = use_case.execute(&identity, copy_id).await?;

    Ok(Json(BorrowResponse {
        copy_id: receipt.copy_id,
        loan_id: receipt.loan_id,
        due_date: receipt.due_date,
        message: format!("Successfully borrowed book ID: {}", receipt.copy_id),
        category: MessageCategory::Success,
    }))
}

/// POST /api/lending/copies/{copy_id}/return
pub async fn return_copy<S: LendingStore>(
    State(state): State<LendingAppState<S>>,
    Extension(identity): Extension<Identity>,
    Path(copy_id): Path<CopyId>,
) -> LendingResult<Json<ReturnResponse>> {
    let use_case = ReturnUseCase::new(state.store.clone(), state.clock.clone());
    let receipt = use_case.execute(&identity, copy_id).await?;

    let (message, category) = if receipt.was_overdue {
        (
            "Book returned after its due date. Thank you",
            MessageCategory::Warning,
        )
    } else {
        ("Book successfully returned! Thank you", MessageCategory::Success)
    };

    Ok(Json(ReturnResponse {
        copy_id: receipt.copy_id,
        returned_at: receipt.returned_at,
        was_overdue: receipt.was_overdue,
        message: message.to_string(),
        category,
    }))
}

/// GET /api/lending/me/loans
pub async fn my_loans<S: LendingStore>(
    State(state): State<LendingAppState<S>>,
    Extension(identity): Extension<Identity>,
) -> LendingResult<Json<LoansResponse>> {
    let loans = state.queries().list_my_borrowed(&identity).await?;
    Ok(Json(LoansResponse { loans }))
}

/// GET /api/lending/me/history
pub async fn my_history<S: LendingStore>(
    State(state): State<LendingAppState<S>>,
    Extension(identity): Extension<Identity>,
) -> LendingResult<Json<HistoryResponse>> {
    let entries = state.queries().history(&identity).await?;
    Ok(Json(HistoryResponse { entries }))
}

/// GET /api/lending/overdue
pub async fn overdue<S: LendingStore>(
    State(state): State<LendingAppState<S>>,
    Extension(identity): Extension<Identity>,
) -> LendingResult<Json<LoansResponse>> {
    let loans = state.queries().list_overdue(&identity).await?;
    Ok(Json(LoansResponse { loans }))
}
