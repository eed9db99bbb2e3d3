//! In-memory account store
//!
//! Backs tests and local runs without Postgres. One async mutex guards the
//! whole map; a transaction holds the guard and stages writes on a copy that
//! replaces the map on commit.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::entity::Account;
use crate::domain::repository::{AccountRepository, AccountTx, AccountUnitOfWork};
use crate::domain::value_object::AccountName;
use crate::error::{AuthError, AuthResult};

type AccountMap = HashMap<String, Account>;

#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    storage: Arc<Mutex<AccountMap>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountRepository for InMemoryAccountRepository {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        let mut storage = self.storage.lock().await;
        let key = account.name.canonical().to_string();
        if storage.contains_key(&key) {
            return Err(AuthError::UsernameTaken);
        }
        storage.insert(key, account.clone());
        Ok(())
    }

    async fn find_by_name(&self, name: &AccountName) -> AuthResult<Option<Account>> {
        Ok(self.storage.lock().await.get(name.canonical()).cloned())
    }

    async fn list(&self) -> AuthResult<Vec<Account>> {
        let storage = self.storage.lock().await;
        let mut accounts: Vec<Account> = storage.values().cloned().collect();
        accounts.sort_by(|a, b| a.name.canonical().cmp(b.name.canonical()));
        Ok(accounts)
    }

    async fn delete(&self, name: &AccountName) -> AuthResult<bool> {
        Ok(self.storage.lock().await.remove(name.canonical()).is_some())
    }
}

impl AccountUnitOfWork for InMemoryAccountRepository {
    type Tx = InMemoryAccountTx;

    async fn begin(&self) -> AuthResult<InMemoryAccountTx> {
        let guard = self.storage.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(InMemoryAccountTx { guard, staged })
    }
}

pub struct InMemoryAccountTx {
    guard: OwnedMutexGuard<AccountMap>,
    staged: AccountMap,
}

impl AccountTx for InMemoryAccountTx {
    async fn lock_account(&mut self, name: &AccountName) -> AuthResult<Option<Account>> {
        Ok(self.staged.get(name.canonical()).cloned())
    }

    async fn save(&mut self, account: &Account) -> AuthResult<()> {
        let key = account.name.canonical();
        match self.staged.get_mut(key) {
            Some(slot) => {
                *slot = account.clone();
                Ok(())
            }
            None => Err(AuthError::NoSuchAccount),
        }
    }

    async fn commit(mut self) -> AuthResult<()> {
        *self.guard = std::mem::take(&mut self.staged);
        Ok(())
    }
}
