//! Router assembly
//!
//! Mounts the auth and lending routers. Lending routes are wrapped in the
//! identity middleware so every handler sees the caller's `Identity`.

use auth::domain::repository::{AccountRepository, AccountUnitOfWork};
use auth::{AuthAppState, auth_router, require_identity};
use axum::Router;
use axum::middleware;
use lending::domain::LendingStore;
use lending::{LendingAppState, lending_router};

pub fn app_router<A, L>(auth_state: AuthAppState<A>, lending_state: LendingAppState<L>) -> Router
where
    A: AccountRepository + AccountUnitOfWork + Send + Sync + 'static,
    L: LendingStore,
{
    let guard = auth_state.guard();

    Router::new()
        .nest("/api/auth", auth_router(auth_state))
        .nest(
            "/api/lending",
            lending_router(lending_state)
                .layer(middleware::from_fn_with_state(guard, require_identity)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use auth::AuthConfig;
    use auth::InMemoryAccountRepository;
    use auth::domain::entity::Account;
    use auth::domain::value_object::AccountName;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use kernel::clock::{Clock, SystemClock};
    use kernel::identity::Role;
    use lending::domain::{BookCopy, CatalogRepository};
    use lending::{InMemoryLendingStore, LendingConfig};
    use platform::password::{Argon2Hasher, ClearTextPassword, PasswordHasher};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        let config = AuthConfig::development();
        let hasher: Arc<dyn PasswordHasher> =
            Arc::new(Argon2Hasher::new(config.argon2).unwrap());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let accounts = InMemoryAccountRepository::new();
        let hash = hasher
            .hash(&ClearTextPassword::new("alice-secret-1".to_string()).unwrap())
            .unwrap();
        let alice = Account::new(AccountName::new("alice").unwrap(), hash, Role::Reader, clock.now());
        accounts.create(&alice).await.unwrap();
        // Assigned password never rotated, so login demands a change
        let hash = hasher
            .hash(&ClearTextPassword::new("marian-secret-1".to_string()).unwrap())
            .unwrap();
        let marian = Account::new(AccountName::new("marian").unwrap(), hash, Role::Librarian, clock.now());
        accounts.create(&marian).await.unwrap();

        let copies = InMemoryLendingStore::new();
        copies
            .add_copy(&BookCopy::new(42, "The Hitchhiker's Guide", "Douglas Adams", "Sci-Fi"))
            .await
            .unwrap();

        app_router(
            AuthAppState::new(accounts, hasher, clock.clone(), config),
            LendingAppState::new(copies, clock, LendingConfig::default()),
        )
    }

    fn borrow_request(cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/lending/copies/42/borrow");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn lending_requires_identity_cookie() {
        let app = test_app().await;
        let response = app.oneshot(borrow_request(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    fn login_request(username: &str, password: &str, role: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({"username": username, "password": password, "role": role})
                    .to_string(),
            ))
            .unwrap()
    }

    fn cookie_of(response: &axum::response::Response) -> String {
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    fn overdue_request(cookie: &str) -> Request<Body> {
        Request::builder()
            .uri("/api/lending/overdue")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn password_change_cookie_is_refused_by_lending() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(login_request("marian", "marian-secret-1", "librarian"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let restricted = cookie_of(&response);

        let response = app.clone().oneshot(overdue_request(&restricted)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let change = Request::builder()
            .method("PUT")
            .uri("/api/auth/password")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, &restricted)
            .body(Body::from(
                serde_json::json!({"newPassword": "marian-secret-2"}).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(change).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let full = cookie_of(&response);

        let response = app.oneshot(overdue_request(&full)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn login_then_borrow() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(login_request("Alice", "alice-secret-1", "reader"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = cookie_of(&response);

        let response = app.oneshot(borrow_request(Some(&cookie))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
