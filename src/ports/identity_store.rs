//! Local persisted identity cache port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::UserId;

/// Port for the local persisted identity cache.
///
/// Stores the last-known local user id so login/logout/switch transitions
/// can be detected across app restarts. Only the identity binder writes it.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Loads the last-known user id, if any.
    async fn load(&self) -> Result<Option<UserId>, IdentityStoreError>;

    /// Persists the given user id as last-known.
    async fn save(&self, user_id: &UserId) -> Result<(), IdentityStoreError>;

    /// Clears the cache (logout).
    async fn clear(&self) -> Result<(), IdentityStoreError>;
}

/// Errors from the identity cache.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityStoreError {
    /// Underlying storage failed.
    #[error("identity cache io error: {0}")]
    Io(String),

    /// Stored data could not be interpreted.
    #[error("identity cache corrupted: {0}")]
    Corrupted(String),
}
