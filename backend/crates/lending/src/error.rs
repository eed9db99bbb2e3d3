//! Lending Error Types
//!
//! This module provides lending-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use kernel::message::MessageCategory;
use thiserror::Error;

/// Lending-specific result type alias
pub type LendingResult<T> = Result<T, LendingError>;

/// Lending-specific error variants
#[derive(Debug, Error)]
pub enum LendingError {
    /// The account already holds the maximum number of copies
    #[error("Borrow limit reached ({count} open)")]
    LimitReached { count: u32 },

    #[error("Copy not found")]
    CopyNotFound,

    /// The copy is lent to someone else (or was taken concurrently)
    #[error("Copy already borrowed")]
    AlreadyBorrowed,

    /// No open borrow of this copy by the caller
    #[error("Nothing to return")]
    NothingToReturn,

    /// Caller role may not perform the operation
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LendingError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LendingError::LimitReached { .. }
            | LendingError::AlreadyBorrowed
            | LendingError::NothingToReturn => ErrorKind::Conflict,
            LendingError::CopyNotFound => ErrorKind::NotFound,
            LendingError::Unauthorized => ErrorKind::Unauthorized,
            LendingError::Database(e) => ErrorKind::of_sqlx(e),
            LendingError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn category(&self) -> MessageCategory {
        self.kind().category()
    }

    pub fn user_message(&self) -> String {
        match self {
            LendingError::LimitReached { count } => {
                format!("Limit reached! You currently have {count} books out.")
            }
            LendingError::CopyNotFound => "Book does not exist in database.".to_string(),
            LendingError::AlreadyBorrowed => {
                "This book is already borrowed by someone else.".to_string()
            }
            LendingError::NothingToReturn => "You have not borrowed this book.".to_string(),
            LendingError::Unauthorized => "Unauthorized action.".to_string(),
            LendingError::Database(_) | LendingError::Internal(_) => {
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
            LendingError::Database(e) => {
                tracing::error!(error = %e, "Lending database error");
            }
            LendingError::Internal(msg) => {
                tracing::error!(message = %msg, "Lending internal error");
            }
            LendingError::Unauthorized => {
                tracing::warn!("Lending operation with the wrong role");
            }
            _ => {
                tracing::debug!(error = %self, "Lending error");
            }
        }
    }
}

impl From<LendingError> for AppError {
    fn from(err: LendingError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for LendingError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_are_danger() {
        for err in [
            LendingError::LimitReached { count: 3 },
            LendingError::CopyNotFound,
            LendingError::AlreadyBorrowed,
            LendingError::NothingToReturn,
        ] {
            assert_eq!(err.category(), MessageCategory::Danger);
        }
    }

    #[test]
    fn limit_message_names_the_count() {
        let err = LendingError::LimitReached { count: 3 };
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            err.user_message(),
            "Limit reached! You currently have 3 books out."
        );
    }

    #[test]
    fn store_failures_stay_generic() {
        let err = LendingError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(
            err.user_message(),
            kernel::error::app_error::GENERIC_FAILURE_MESSAGE
        );
    }
}
