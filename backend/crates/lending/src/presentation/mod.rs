//! Presentation Layer - HTTP handlers, DTOs, router

pub mod dto;
pub mod handlers;
pub mod router;

pub use handlers::LendingAppState;
pub use router::lending_router;
