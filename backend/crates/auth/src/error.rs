//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::message::MessageCategory;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Shown for unknown accounts, wrong passwords and wrong roles alike.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username, password or role.";

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No account with that name. Surfaced exactly like `InvalidCredentials`.
    #[error("Account not found")]
    AccountNotFound,

    /// Wrong password or wrong claimed role
    #[error("Invalid credentials (attempt {attempts})")]
    InvalidCredentials { attempts: u16 },

    /// `None` means the lockout has no end
    #[error("Account is locked")]
    AccountLocked { remaining_minutes: Option<i64> },

    /// Target of an account operation does not exist
    #[error("No such account")]
    NoSuchAccount,

    /// Missing or insufficient role for the operation
    #[error("Unauthorized")]
    Unauthorized,

    /// Operation not allowed on this target account
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),

    #[error("Account name already exists")]
    UsernameTaken,

    #[error("Invalid account name: {0}")]
    InvalidAccountName(String),

    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AccountNotFound
            | AuthError::InvalidCredentials { .. }
            | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::NoSuchAccount => ErrorKind::NotFound,
            AuthError::AccountLocked { .. } => ErrorKind::Locked,
            AuthError::Forbidden(_) => ErrorKind::Forbidden,
            AuthError::UsernameTaken => ErrorKind::Conflict,
            AuthError::InvalidAccountName(_) | AuthError::PasswordValidation(_) => {
                ErrorKind::BadRequest
            }
            AuthError::Database(e) => ErrorKind::of_sqlx(e),
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn category(&self) -> MessageCategory {
        self.kind().category()
    }

    /// Text safe to show the person at the keyboard
    pub fn user_message(&self) -> String {
        match self {
            AuthError::AccountNotFound | AuthError::InvalidCredentials { .. } => {
                INVALID_CREDENTIALS_MESSAGE.to_string()
            }
            AuthError::AccountLocked {
                remaining_minutes: Some(minutes),
            } => format!("Account locked. Try again in {minutes} minute(s)."),
            AuthError::AccountLocked {
                remaining_minutes: None,
            } => "Account locked. Contact the primary administrator.".to_string(),
            AuthError::NoSuchAccount => "No such account.".to_string(),
            AuthError::Unauthorized => "Unauthorized action.".to_string(),
            AuthError::Forbidden(reason) => (*reason).to_string(),
            AuthError::UsernameTaken => "That account name is already taken.".to_string(),
            AuthError::InvalidAccountName(msg) | AuthError::PasswordValidation(msg) => msg.clone(),
            AuthError::Database(_) | AuthError::Internal(_) => {
                kernel::error::app_error::GENERIC_FAILURE_MESSAGE.to_string()
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.user_message())
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::AccountNotFound | AuthError::InvalidCredentials { .. } => {
                tracing::warn!(error = %self, "Invalid login attempt");
            }
            AuthError::AccountLocked { remaining_minutes } => {
                tracing::warn!(?remaining_minutes, "Login attempt on locked account");
            }
            AuthError::Unauthorized | AuthError::Forbidden(_) => {
                tracing::warn!(error = %self, "Rejected account operation");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::PasswordValidation(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<crate::domain::value_object::AccountNameError> for AuthError {
    fn from(err: crate::domain::value_object::AccountNameError) -> Self {
        AuthError::InvalidAccountName(err.to_string())
    }
}
