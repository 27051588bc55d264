use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{AccountStore, StoreError};
use super::Account;
use crate::college;
use crate::roles::Role;

/// In-memory account store backed by a `HashMap` under an async `RwLock`.
///
/// Used by the test suite and for local development without Postgres. The
/// compare-and-set mutations hold the write lock across the read-validate-
/// write sequence, so they are atomic with respect to each other.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let store = Self::new();
        {
            let mut map = store.accounts.write().await;
            for account in accounts {
                map.insert(account.id, account);
            }
        }
        store
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.accounts.read().await.values().cloned().collect())
    }

    async fn find_by_college(&self, college_id: &str) -> Result<Vec<Account>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .filter(|a| college::same_college(a.college_id.as_deref(), Some(college_id)))
            .cloned()
            .collect())
    }

    async fn insert(&self, account: &Account) -> Result<(), StoreError> {
        self.accounts
            .write()
            .await
            .insert(account.id, account.clone());
        Ok(())
    }

    async fn update_role(
        &self,
        id: Uuid,
        expected: Role,
        new_role: Role,
    ) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        if account.role != expected {
            return Err(StoreError::Conflict);
        }
        account.role = new_role;
        Ok(account.clone())
    }

    async fn delete(&self, id: Uuid, expected: Role) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;
        match accounts.get(&id) {
            None => Err(StoreError::NotFound),
            Some(account) if account.role != expected => Err(StoreError::Conflict),
            Some(_) => {
                accounts.remove(&id);
                Ok(())
            }
        }
    }
}
