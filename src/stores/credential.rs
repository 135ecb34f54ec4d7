//! Credential store collaborators.

use crate::stores::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;

/// Port for validating username/password pairs. Password policy and
/// hashing live behind this seam, not in the engine.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn verify(&self, identity: &str, credential: &str) -> Result<bool, StoreError>;
}

/// File-backed credential store reading a JSON map of identity to
/// credential. The file is re-read on every verification so edits apply
/// without a restart.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn verify(&self, identity: &str, credential: &str) -> Result<bool, StoreError> {
        let raw = tokio::fs::read(&self.path).await?;
        let users: HashMap<String, String> = serde_json::from_slice(&raw)?;
        Ok(users.get(identity).is_some_and(|c| c == credential))
    }
}

/// In-memory credential store used by the test suites.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: HashMap<String, String>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, identity: &str, credential: &str) -> Self {
        self.users
            .insert(identity.to_string(), credential.to_string());
        self
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn verify(&self, identity: &str, credential: &str) -> Result<bool, StoreError> {
        Ok(self.users.get(identity).is_some_and(|c| c == credential))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_reloads_on_every_verify() {
        let dir = std::env::temp_dir().join(format!("gatewatch-users-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("users.json");
        std::fs::write(&path, r#"{"alice":"s3cret"}"#).unwrap();

        let store = FileCredentialStore::new(&path);
        assert!(store.verify("alice", "s3cret").await.unwrap());
        assert!(!store.verify("alice", "wrong").await.unwrap());
        assert!(!store.verify("bob", "s3cret").await.unwrap());

        // An edit takes effect without rebuilding the store.
        std::fs::write(&path, r#"{"bob":"hunter2"}"#).unwrap();
        assert!(store.verify("bob", "hunter2").await.unwrap());
        assert!(!store.verify("alice", "s3cret").await.unwrap());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn missing_users_file_is_an_error() {
        let store = FileCredentialStore::new("/nonexistent/users.json");
        assert!(store.verify("alice", "s3cret").await.is_err());
    }
}
