//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod token;

pub use handlers::AuthAppState;
pub use middleware::{IdentityGuard, require_identity};
pub use router::auth_router;
