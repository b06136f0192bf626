//! Volatile credential store backed by a `DashMap`.
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use uuid::Uuid;

use super::{Account, CredentialStore, NewAccount, StoreError};

/// In-memory store keyed by email
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: DashMap<String, Account>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(email).map(|entry| entry.value().clone()))
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        // The shard lock is held from the vacancy test to the insert.
        match self.accounts.entry(account.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(account.email)),
            Entry::Vacant(slot) => {
                let account = account.into_account(Uuid::new_v4());
                slot.insert(account.clone());
                Ok(account)
            },
        }
    }
}
