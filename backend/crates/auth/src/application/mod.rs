//! Application Layer
//!
//! Use cases and application services.

pub mod admin;
pub mod change_password;
pub mod config;
pub mod login;

// Re-exports
pub use admin::{AccountAdminUseCase, AccountSummary};
pub use change_password::ChangePasswordUseCase;
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutcome, LoginUseCase};
