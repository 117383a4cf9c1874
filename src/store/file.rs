// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local JSON file store used by the batch CLI and single-host deployments.

use super::{StoreError, TokenStore};
use crate::models::Credentials;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Credentials persisted as pretty-printed JSON on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileStore {
    async fn load(&self) -> Result<Option<Credentials>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn put(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(credentials)?;

        // Write beside the target, then rename over it
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::info!(path = %self.path.display(), "Credentials written to file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Credentials {
        Credentials {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_in: 86400,
            created_at: 0,
            token_type: "bearer".to_string(),
            scope: Some("public".to_string()),
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nope.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_stamps_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("creds.json"));

        let before = chrono::Utc::now().timestamp();
        let saved = store.save(sample()).await.unwrap();
        assert!(saved.created_at >= before);

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert!(!dir.path().join("creds.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = FileStore::new(path);
        assert!(matches!(store.load().await, Err(StoreError::Serde(_))));
    }
}
