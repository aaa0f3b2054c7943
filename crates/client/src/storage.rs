//! Local cache of the signed-in identity.
//!
//! Read once at startup so the current user can be shown before the remote
//! session is confirmed, overwritten on every auth change and cleared on
//! sign-out.

use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use bread_core::User;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading or writing the identity cache.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Identity cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Identity cache is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Where the current identity is persisted.
pub trait IdentityStore: Send + Sync + Debug {
    /// The cached identity, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cache exists but cannot be read.
    fn load(&self) -> Result<Option<User>, StorageError>;

    /// Replace the cached identity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cache cannot be written.
    fn store(&self, user: &User) -> Result<(), StorageError>;

    /// Forget the cached identity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if an existing cache cannot be removed.
    fn clear(&self) -> Result<(), StorageError>;
}

/// On-disk layout: a single `user` key.
#[derive(Serialize, Deserialize)]
struct CacheFile {
    user: Option<User>,
}

/// JSON file cache.
#[derive(Debug, Clone)]
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IdentityStore for FileIdentityStore {
    fn load(&self) -> Result<Option<User>, StorageError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice::<CacheFile>(&bytes)?.user),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, user: &User) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(&CacheFile {
            user: Some(user.clone()),
        })?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-process cache, for tests and one-shot tools.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    user: Mutex<Option<User>>,
}

impl MemoryIdentityStore {
    /// A store pre-populated with `user`.
    #[must_use]
    pub const fn with_user(user: User) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn load(&self) -> Result<Option<User>, StorageError> {
        Ok(self.user.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn store(&self, user: &User) -> Result<(), StorageError> {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = Some(user.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.user.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bread_core::{Email, UserRole};
    use chrono::Utc;

    use super::*;

    fn user() -> User {
        User {
            id: "6f1c2a4e-8d3b-4a57-9e21-3c5d7b9f0a12".parse().unwrap(),
            email: Email::parse("baker@bread.io").unwrap(),
            name: "Baker".to_string(),
            role: UserRole::Standard,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileIdentityStore::new(dir.path().join("identity.json"));
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_persists_under_user_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileIdentityStore::new(dir.path().join("nested").join("identity.json"));

        let user = user();
        store.store(&user).unwrap();
        assert_eq!(store.load().unwrap(), Some(user));

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.path()).unwrap()).unwrap();
        assert_eq!(raw["user"]["email"], "baker@bread.io");
        assert_eq!(raw["user"]["role"], "user");

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_file_store_rejects_corrupt_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.json");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            FileIdentityStore::new(path).load(),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryIdentityStore::with_user(user());
        assert!(store.load().unwrap().is_some());
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }
}
