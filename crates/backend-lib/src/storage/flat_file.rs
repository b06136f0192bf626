//! Flat-file document store: one JSON document per account.
//!
//! Layout under the root directory:
//! - `accounts/<base64url(email)>.json`: published account documents
//! - `tmp/<uuid>.json`: documents being written
//!
//! A document is fully written to `tmp/` and then published with a hard
//! link. Linking onto an existing name fails with `AlreadyExists`, which
//! makes the file system the arbiter of email uniqueness.
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use tokio::{fs as tokio_fs, io::AsyncWriteExt};
use uuid::Uuid;

use super::{Account, CredentialStore, NewAccount, StoreError};

const ACCOUNTS_DIR: &str = "accounts";
const TMP_DIR: &str = "tmp";

/// Longest file name common file systems accept
const MAX_FILE_NAME_LEN: usize = 255;

/// Flat-file implementation of [`CredentialStore`]
#[derive(Debug, Clone)]
pub struct FlatFileStore {
    root: PathBuf,
}

impl FlatFileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(ACCOUNTS_DIR))?;
        fs::create_dir_all(root.join(TMP_DIR))?;
        Ok(Self { root })
    }

    /// Document path for `email`, or `None` when the encoded name is too
    /// long to exist on disk
    fn document_path(&self, email: &str) -> Option<PathBuf> {
        let name = format!("{}.json", URL_SAFE_NO_PAD.encode(email.as_bytes()));
        if name.len() > MAX_FILE_NAME_LEN {
            return None;
        }
        Some(self.root.join(ACCOUNTS_DIR).join(name))
    }

    /// Write `bytes` to `path` and flush them to disk
    async fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let mut file = tokio_fs::File::create(path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FlatFileStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let Some(path) = self.document_path(email) else {
            return Ok(None);
        };
        match tokio_fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let path = self.document_path(&account.email).ok_or_else(|| {
            StoreError::Io(io::Error::new(
                ErrorKind::InvalidInput,
                "email too long for an account document name",
            ))
        })?;
        let account = account.into_account(Uuid::new_v4());
        let json = serde_json::to_vec_pretty(&account)?;

        // Published documents must never be seen half written, even after a crash.
        let staged = self.root.join(TMP_DIR).join(format!("{}.json", account.id));
        if let Err(e) = Self::write_synced(&staged, &json).await {
            let _ = tokio_fs::remove_file(&staged).await;
            return Err(e);
        }

        let published = tokio_fs::hard_link(&staged, &path).await;
        if let Err(e) = tokio_fs::remove_file(&staged).await {
            tracing::warn!(path = %staged.display(), error = %e, "failed to remove staged account document");
        }

        match published {
            Ok(()) => Ok(account),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(StoreError::DuplicateKey(account.email))
            },
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}
