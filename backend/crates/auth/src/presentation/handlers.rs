//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use kernel::clock::Clock;
use kernel::identity::Identity;
use kernel::message::MessageCategory;
use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::application::{
    AccountAdminUseCase, AccountSummary, ChangePasswordUseCase, LoginInput, LoginOutcome,
    LoginUseCase,
};
use crate::domain::repository::{AccountRepository, AccountUnitOfWork};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccountListResponse, ChangePasswordRequest, CreateAccountRequest, LoginRequest,
    LoginResponse, MessageResponse, ResetPasswordRequest, SessionResponse,
};
use crate::presentation::middleware::IdentityGuard;
use crate::presentation::token::{self, TokenScope};

/// Shared state for auth handlers
pub struct AuthAppState<R> {
    pub repo: Arc<R>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AuthConfig>,
}

// Manual impl: `R` itself need not be `Clone`
impl<R> Clone for AuthAppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            hasher: self.hasher.clone(),
            clock: self.clock.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R> AuthAppState<R> {
    pub fn new(
        repo: R,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        config: AuthConfig,
    ) -> Self {
        Self {
            repo: Arc::new(repo),
            hasher,
            clock,
            config: Arc::new(config),
        }
    }

    pub fn guard(&self) -> IdentityGuard {
        IdentityGuard::new(self.config.clone(), self.clock.clone())
    }

    fn admin(&self) -> AccountAdminUseCase<R>
    where
        R: AccountRepository + AccountUnitOfWork,
    {
        AccountAdminUseCase::new(
            self.repo.clone(),
            self.hasher.clone(),
            self.clock.clone(),
            self.config.clone(),
        )
    }

    fn identity_cookie(&self, identity: &Identity, scope: TokenScope) -> AuthResult<HeaderValue> {
        let token = token::mint(&self.config, identity, scope, self.clock.now())?;
        platform::cookie::set_cookie_header(&self.config.cookie, &token)
            .ok_or_else(|| AuthError::Internal("Invalid Set-Cookie value".to_string()))
    }
}

// ============================================================================
// Login / Logout
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + AccountUnitOfWork + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.clock.clone(),
        state.config.clone(),
    );

    let outcome = use_case
        .execute(LoginInput {
            username: req.username,
            password: req.password,
            role: req.role,
        })
        .await?;

    let (scope, must_change_password, message, category) = match &outcome {
        LoginOutcome::Authenticated(_) => (
            TokenScope::Full,
            false,
            "Login successful.",
            MessageCategory::Success,
        ),
        LoginOutcome::MustChangePassword(_) => (
            TokenScope::PasswordChange,
            true,
            "Your password has expired. Please choose a new one.",
            MessageCategory::Warning,
        ),
    };
    let identity = outcome.identity();
    let cookie = state.identity_cookie(identity, scope)?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            username: identity.username.clone(),
            role: identity.role,
            must_change_password,
            message: message.to_string(),
            category,
        }),
    ))
}

/// POST /api/auth/logout
pub async fn logout<R>(State(state): State<AuthAppState<R>>) -> AuthResult<impl IntoResponse> {
    let cookie = platform::cookie::delete_cookie_header(&state.config.cookie)
        .ok_or_else(|| AuthError::Internal("Invalid Set-Cookie value".to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::success("Logged out successfully.")),
    ))
}

/// GET /api/auth/session
pub async fn session<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    let response = match state.guard().claims(&headers) {
        Some(claims) => SessionResponse {
            authenticated: claims.scope == TokenScope::Full,
            username: Some(claims.username),
            role: Some(claims.role),
            must_change_password: claims.scope == TokenScope::PasswordChange,
        },
        None => SessionResponse {
            authenticated: false,
            username: None,
            role: None,
            must_change_password: false,
        },
    };
    Json(response)
}

// ============================================================================
// Own password
// ============================================================================

/// PUT /api/auth/password
///
/// Accepts both token scopes; answers with a fresh full-scope cookie.
pub async fn change_password<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository + AccountUnitOfWork + Send + Sync + 'static,
{
    let identity = state
        .guard()
        .claims(&headers)
        .map(|claims| claims.identity())
        .ok_or(AuthError::Unauthorized)?;

    let use_case =
        ChangePasswordUseCase::new(state.repo.clone(), state.hasher.clone(), state.clock.clone());
    use_case.execute(&identity, req.new_password).await?;

    let cookie = state.identity_cookie(&identity, TokenScope::Full)?;
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse::success("Password changed.")),
    ))
}

// ============================================================================
// Account administration (librarian)
// ============================================================================

/// GET /api/auth/accounts
pub async fn list_accounts<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Json<AccountListResponse>>
where
    R: AccountRepository + AccountUnitOfWork + Send + Sync + 'static,
{
    let acting = state.guard().identity(&headers)?;
    let accounts = state.admin().list_accounts(&acting).await?;
    Ok(Json(AccountListResponse { accounts }))
}

/// POST /api/auth/accounts
pub async fn create_account<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    Json(req): Json<CreateAccountRequest>,
) -> AuthResult<(StatusCode, Json<AccountSummary>)>
where
    R: AccountRepository + AccountUnitOfWork + Send + Sync + 'static,
{
    let acting = state.guard().identity(&headers)?;
    let summary = state
        .admin()
        .create_account(&acting, &req.username, req.password, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /api/auth/accounts/{username}
pub async fn account_state<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> AuthResult<Json<AccountSummary>>
where
    R: AccountRepository + AccountUnitOfWork + Send + Sync + 'static,
{
    let acting = state.guard().identity(&headers)?;
    let summary = state.admin().account_state(&acting, &username).await?;
    Ok(Json(summary))
}

/// DELETE /api/auth/accounts/{username}
pub async fn delete_account<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + AccountUnitOfWork + Send + Sync + 'static,
{
    let acting = state.guard().identity(&headers)?;
    state.admin().delete_account(&acting, &username).await?;
    Ok(Json(MessageResponse::success(format!("Account {username} deleted."))))
}

/// PUT /api/auth/accounts/{username}/password
pub async fn reset_password<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    Path(username): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository + AccountUnitOfWork + Send + Sync + 'static,
{
    let acting = state.guard().identity(&headers)?;
    state
        .admin()
        .reset_password(&acting, &username, req.new_password)
        .await?;
    Ok(Json(MessageResponse::success(format!(
        "Password for {username} has been reset."
    ))))
}
