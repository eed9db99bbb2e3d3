//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (BookCopy, LedgerEntry, OpenLoan)
//! - Domain value objects (CatalogQuery)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod value_objects;

pub use entities::{BookCopy, CopyId, LedgerAction, LedgerEntry, OpenLoan};
pub use repository::{
    CatalogRepository, LedgerRepository, LendingStore, LendingTx, LendingUnitOfWork,
};
pub use value_objects::CatalogQuery;
