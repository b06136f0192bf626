// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! Credential store abstraction with in-memory and flat-file implementations.
use std::path::PathBuf;
use std::sync::Arc;

use accounts_common::{AccountId, UserProfile};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod flat_file;
mod memory;

pub use flat_file::FlatFileStore;
pub use memory::MemoryStore;

/// A persisted account record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    /// Unique key of the collection, compared case-sensitively
    pub email: String,
    pub password_hash: String,
}

impl Account {
    /// Public view of the account, without the password hash
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            dob: self.date_of_birth,
        }
    }
}

/// Account fields supplied by the caller; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub password_hash: String,
}

impl NewAccount {
    fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            name: self.name,
            date_of_birth: self.date_of_birth,
            email: self.email,
            password_hash: self.password_hash,
        }
    }
}

/// Errors raised by credential stores
#[derive(Error, Debug)]
pub enum StoreError {
    /// An account with this email already exists
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt account document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported store url: {0}")]
    UnsupportedUrl(String),
}

/// Trait for credential store backends
///
/// Implementations must make the uniqueness check and the insert in
/// [`CredentialStore::create`] a single atomic step.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up an account by its exact email
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Insert a new account, failing with [`StoreError::DuplicateKey`] if the
    /// email is taken. State is left untouched on failure.
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        (**self).create(account).await
    }
}

/// Parsed form of the store connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUrl {
    /// `memory:`, volatile, for tests and demos
    Memory,
    /// `file:<path>` or a bare path
    File(PathBuf),
}

impl StoreUrl {
    pub fn parse(url: &str) -> Result<Self, StoreError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(StoreError::UnsupportedUrl("empty store url".to_string()));
        }
        if url == "memory:" || url == "memory://" {
            return Ok(StoreUrl::Memory);
        }
        if let Some(path) = url.strip_prefix("file://").or_else(|| url.strip_prefix("file:")) {
            if path.is_empty() {
                return Err(StoreError::UnsupportedUrl(url.to_string()));
            }
            return Ok(StoreUrl::File(PathBuf::from(path)));
        }
        if url.contains("://") {
            return Err(StoreError::UnsupportedUrl(url.to_string()));
        }
        Ok(StoreUrl::File(PathBuf::from(url)))
    }
}

/// Open the credential store named by a connection string
pub fn open_store(url: &str) -> Result<Arc<dyn CredentialStore>, StoreError> {
    match StoreUrl::parse(url)? {
        StoreUrl::Memory => {
            tracing::warn!("using in-memory credential store, accounts will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        },
        StoreUrl::File(path) => {
            tracing::info!(path = %path.display(), "opening flat-file credential store");
            Ok(Arc::new(FlatFileStore::new(path)?))
        },
    }
}

#[cfg(test)]
pub(crate) fn sample_account(email: &str) -> NewAccount {
    NewAccount {
        name: "Ann".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        email: email.to_string(),
        password_hash: "$2b$04$notarealhashnotarealhashnotarealhashnotarealhashnot".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_url_parsing() {
        assert_eq!(StoreUrl::parse("memory:").unwrap(), StoreUrl::Memory);
        assert_eq!(
            StoreUrl::parse("file:/var/lib/accounts").unwrap(),
            StoreUrl::File(PathBuf::from("/var/lib/accounts"))
        );
        assert_eq!(
            StoreUrl::parse("file:///var/lib/accounts").unwrap(),
            StoreUrl::File(PathBuf::from("/var/lib/accounts"))
        );
        assert_eq!(StoreUrl::parse("data").unwrap(), StoreUrl::File(PathBuf::from("data")));
        assert!(StoreUrl::parse("").is_err());
        assert!(StoreUrl::parse("file:").is_err());
        assert!(StoreUrl::parse("mongodb://localhost:27017/accounts").is_err());
    }

    #[test]
    fn profile_omits_hash() {
        let account = sample_account("ann@x.com").into_account(AccountId::new_v4());
        let profile = account.profile();
        assert_eq!(profile.id, account.id);
        assert_eq!(profile.email, "ann@x.com");
        let json = serde_json::to_string(&profile).unwrap();
        assert!(!json.contains(&account.password_hash));
    }

    #[tokio::test]
    async fn open_store_memory_roundtrip() {
        let store = open_store("memory:").unwrap();
        let created = store.create(sample_account("ann@x.com")).await.unwrap();
        let found = store.find_by_email("ann@x.com").await.unwrap();
        assert_eq!(found, Some(created));
    }
}
