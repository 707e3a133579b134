//! In-memory identity cache for tests and ephemeral sessions.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::foundation::UserId;
use crate::ports::{IdentityStore, IdentityStoreError};

/// Identity cache that lives only as long as the process.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    inner: Mutex<Option<UserId>>,
}

impl InMemoryIdentityStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a last-known user.
    pub fn with_user(user_id: UserId) -> Self {
        Self {
            inner: Mutex::new(Some(user_id)),
        }
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn load(&self) -> Result<Option<UserId>, IdentityStoreError> {
        Ok(self
            .inner
            .lock()
            .map_err(|e| IdentityStoreError::Io(e.to_string()))?
            .clone())
    }

    async fn save(&self, user_id: &UserId) -> Result<(), IdentityStoreError> {
        *self
            .inner
            .lock()
            .map_err(|e| IdentityStoreError::Io(e.to_string()))? = Some(user_id.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), IdentityStoreError> {
        *self
            .inner
            .lock()
            .map_err(|e| IdentityStoreError::Io(e.to_string()))? = None;
        Ok(())
    }
}
