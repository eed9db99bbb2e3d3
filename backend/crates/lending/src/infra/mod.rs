//! Infrastructure Layer - Store implementations

pub mod memory;
pub mod postgres;

pub use memory::InMemoryLendingStore;
pub use postgres::PgLendingRepository;
