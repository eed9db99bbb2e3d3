//! Lending (Circulation) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Copies, ledger entries, repository traits
//! - `application/` - Use cases (borrow, return, queries)
//! - `infra/` - PostgreSQL and in-memory stores
//! - `presentation/` - HTTP handlers
//!
//! ## Circulation rules
//! - A reader holds at most `max_borrow_limit` copies at once
//! - A copy is lent to one reader at a time; the due date is fixed at borrow time
//! - Returns close the open borrow and append a return event
//! - Overdue is computed from the due date on every read

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::LendingConfig;
pub use error::{LendingError, LendingResult};
pub use infra::{InMemoryLendingStore, PgLendingRepository};
pub use presentation::router::lending_router;
pub use presentation::LendingAppState;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
