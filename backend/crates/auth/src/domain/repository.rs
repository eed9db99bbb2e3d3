//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::Account;
use crate::domain::value_object::AccountName;
use crate::error::AuthResult;

/// Account store for reads and whole-row create/delete
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Insert a new account. `AuthError::UsernameTaken` on a duplicate name.
    async fn create(&self, account: &Account) -> AuthResult<()>;

    /// Case-insensitive lookup
    async fn find_by_name(&self, name: &AccountName) -> AuthResult<Option<Account>>;

    /// All accounts ordered by canonical name
    async fn list(&self) -> AuthResult<Vec<Account>>;

    /// Returns `false` when no such account existed
    async fn delete(&self, name: &AccountName) -> AuthResult<bool>;
}

/// Opens a transaction scope over account rows
#[trait_variant::make(AccountUnitOfWork: Send)]
pub trait LocalAccountUnitOfWork {
    type Tx: AccountTx + Send;

    async fn begin(&self) -> AuthResult<Self::Tx>;
}

/// One account transaction
///
/// Dropping without `commit` discards every staged write.
#[trait_variant::make(AccountTx: Send)]
pub trait LocalAccountTx {
    /// Read the current row and hold it until the transaction ends
    async fn lock_account(&mut self, name: &AccountName) -> AuthResult<Option<Account>>;

    async fn save(&mut self, account: &Account) -> AuthResult<()>;

    async fn commit(self) -> AuthResult<()>;
}
