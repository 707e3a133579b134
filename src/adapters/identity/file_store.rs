//! File-backed identity cache.
//!
//! Persists the last-known local user id as a small JSON file so identity
//! switches are detected across app restarts. Writes go through a temp file
//! and rename so a crash mid-write cannot corrupt the cache.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;
use crate::ports::{IdentityStore, IdentityStoreError};

/// On-disk shape of the cache.
#[derive(Debug, Serialize, Deserialize)]
struct CachedIdentity {
    user_id: String,
}

/// Identity cache persisted to a JSON file.
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl IdentityStore for FileIdentityStore {
    async fn load(&self) -> Result<Option<UserId>, IdentityStoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IdentityStoreError::Io(e.to_string())),
        };

        let cached: CachedIdentity = serde_json::from_str(&raw)
            .map_err(|e| IdentityStoreError::Corrupted(e.to_string()))?;

        let user_id = UserId::new(cached.user_id)
            .map_err(|e| IdentityStoreError::Corrupted(e.to_string()))?;

        Ok(Some(user_id))
    }

    async fn save(&self, user_id: &UserId) -> Result<(), IdentityStoreError> {
        let cached = CachedIdentity {
            user_id: user_id.as_str().to_string(),
        };
        let json = serde_json::to_string(&cached)
            .map_err(|e| IdentityStoreError::Io(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, json.as_bytes())
            .await
            .map_err(|e| IdentityStoreError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| IdentityStoreError::Io(e.to_string()))?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), IdentityStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IdentityStoreError::Io(e.to_string())),
        }
    }
}
