//! Shared Kernel - Domain-crossing minimal core
//!
//! The vocabulary shared by the `auth` and `lending` crates:
//! - Unified error type, error kinds and the user-facing message category
//! - Typed identifiers and the caller identity
//! - The injected time source
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod clock;
pub mod id;
pub mod identity;
pub mod message;
