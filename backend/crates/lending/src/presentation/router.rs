//! Lending Router

use axum::{
    Router,
    routing::{get, post},
};

use crate::domain::repository::LendingStore;
use crate::presentation::handlers::{self, LendingAppState};

/// Create the Lending router.
///
/// Handlers expect an `Identity` extension; mount this behind the auth
/// crate's `require_identity` layer.
pub fn lending_router<S: LendingStore>(state: LendingAppState<S>) -> Router {
    Router::new()
        .route("/catalog", get(handlers::list_catalog::<S>))
        .route("/copies/{copy_id}/borrow", post(handlers::borrow::<S>))
        .route("/copies/{copy_id}/return", post(handlers::return_copy::<S>))
        .route("/me/loans", get(handlers::my_loans::<S>))
        .route("/me/history", get(handlers::my_history::<S>))
        .route("/overdue", get(handlers::overdue::<S>))
        .with_state(state)
}
