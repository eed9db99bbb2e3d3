//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Account entity, value objects, repository traits
//! - `application/` - Use cases (login, password change, administration)
//! - `infra/` - PostgreSQL and in-memory stores
//! - `presentation/` - HTTP handlers, DTOs, router, identity middleware
//!
//! ## Login state machine
//! - Three consecutive failures lock the account
//! - Readers are locked for a short window that clears itself
//! - Librarians are locked until another librarian resets the password
//! - Librarian passwords expire and must be rotated
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Unknown accounts, wrong passwords and wrong roles are indistinguishable
//! - Identity carried in an HMAC-signed, expiring cookie
//! - The primary administrator (`root`) cannot be reset or deleted

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryAccountRepository, PgAccountRepository};
pub use presentation::router::auth_router;
pub use presentation::{AuthAppState, IdentityGuard, require_identity};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
