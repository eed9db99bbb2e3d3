//! Error conversions - From implementations for infrastructure errors
//!
//! Provides automatic conversion from store and transport errors to
//! [`AppError`]. Connectivity problems become `ServiceUnavailable`; the
//! original error is kept as `source` for logging only.

use super::app_error::AppError;
#[cfg(feature = "sqlx")]
use super::kind::ErrorKind;

// ============================================================================
// SQLx conversions (feature-gated)
// ============================================================================

#[cfg(feature = "sqlx")]
fn classify_sqlx(err: &sqlx::Error) -> (ErrorKind, &'static str) {
    match err {
        sqlx::Error::RowNotFound => (ErrorKind::NotFound, "Record not found"),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => (
            ErrorKind::ServiceUnavailable,
            "Database connection pool exhausted",
        ),
        sqlx::Error::Database(db_err) => {
            // https://www.postgresql.org/docs/current/errcodes-appendix.html
            match db_err.code().as_deref() {
                Some("23505") => (ErrorKind::Conflict, "Duplicate key value"),
                Some("23503") => (ErrorKind::Conflict, "Foreign key violation"),
                Some("40001" | "40P01") => (ErrorKind::ServiceUnavailable, "Transaction conflict"),
                Some("53000" | "53100" | "53200" | "53300") => {
                    (ErrorKind::ServiceUnavailable, "Database resource exhausted")
                }
                Some("57014" | "57P01" | "57P02" | "57P03") => {
                    (ErrorKind::ServiceUnavailable, "Database unavailable")
                }
                _ => (ErrorKind::InternalServerError, "Database error"),
            }
        }
        sqlx::Error::Io(_) => (ErrorKind::ServiceUnavailable, "Database connection error"),
        _ => (ErrorKind::InternalServerError, "Database error"),
    }
}

#[cfg(feature = "sqlx")]
impl ErrorKind {
    /// Classify a store error without consuming it
    pub fn of_sqlx(err: &sqlx::Error) -> Self {
        classify_sqlx(err).0
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let (kind, message) = classify_sqlx(&err);
        AppError::new(kind, message).with_source(err)
    }
}

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 7807 Problem Details for HTTP APIs
        let body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.public_message(),
            "category": self.category(),
            "action": self.action(),
        });

        (status, Json(body)).into_response()
    }
}
