//! Auth Router

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::domain::repository::{AccountRepository, AccountUnitOfWork};
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router for any account store implementation
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: AccountRepository + AccountUnitOfWork + Send + Sync + 'static,
{
    Router::new()
        .route("/login", post(handlers::login::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .route("/session", get(handlers::session::<R>))
        .route("/password", put(handlers::change_password::<R>))
        .route(
            "/accounts",
            get(handlers::list_accounts::<R>).post(handlers::create_account::<R>),
        )
        .route(
            "/accounts/{username}",
            get(handlers::account_state::<R>).delete(handlers::delete_account::<R>),
        )
        .route(
            "/accounts/{username}/password",
            put(handlers::reset_password::<R>),
        )
        .with_state(state)
}
