//! Identity binder: maps the local user to the purchase-service identity.
//!
//! The binding is one-way: the external customer id wraps the immutable
//! internal user id, never the email. Binding is idempotent for the same
//! user; binding a different user reports the previous one so the manager
//! can unbind first. The last-known user id is persisted through the
//! `IdentityStore` port so login/logout/switch transitions are detected
//! across app restarts.

use std::sync::Arc;

use crate::domain::foundation::{ExternalCustomerId, UserId};
use crate::ports::IdentityStore;

/// Result of a bind call, telling the manager what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    /// No binding existed; the user is now bound.
    Bound(ExternalCustomerId),

    /// The same user was already bound. Nothing changed.
    AlreadyBound(ExternalCustomerId),

    /// A different user was bound. The caller must log the previous
    /// session out before using the new binding.
    Switched {
        previous: UserId,
        external_id: ExternalCustomerId,
    },
}

impl BindOutcome {
    /// The external customer id now in effect.
    pub fn external_id(&self) -> &ExternalCustomerId {
        match self {
            BindOutcome::Bound(id) | BindOutcome::AlreadyBound(id) => id,
            BindOutcome::Switched { external_id, .. } => external_id,
        }
    }
}

/// Binds the local user identity to the purchase-service customer identity.
pub struct IdentityBinder {
    store: Arc<dyn IdentityStore>,
    current: Option<UserId>,
}

impl IdentityBinder {
    /// Creates a binder backed by the given identity cache.
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Restores the last-known binding from the persisted cache.
    ///
    /// Called once at startup, before any events are handled. A corrupted
    /// or unreadable cache is treated as no binding; it only means a switch
    /// on this launch cannot be distinguished from a first login.
    pub async fn restore(&mut self) {
        match self.store.load().await {
            Ok(cached) => self.current = cached,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore cached identity; starting unbound");
                self.current = None;
            }
        }
    }

    /// Binds a user, detecting re-binds and user switches.
    ///
    /// Idempotent: binding the bound user again returns `AlreadyBound` with
    /// the same external id. Binding a different user replaces the binding
    /// and reports the previous user in `Switched`.
    pub async fn bind(&mut self, user_id: &UserId) -> BindOutcome {
        let external_id = ExternalCustomerId::for_user(user_id);
        let previous = self.current.clone();

        self.current = Some(user_id.clone());
        if let Err(e) = self.store.save(user_id).await {
            // Binding still holds in memory; only restart detection degrades.
            tracing::warn!(error = %e, "Failed to persist identity binding");
        }

        match previous {
            Some(prev) if prev == *user_id => BindOutcome::AlreadyBound(external_id),
            Some(prev) => BindOutcome::Switched {
                previous: prev,
                external_id,
            },
            None => BindOutcome::Bound(external_id),
        }
    }

    /// Clears the binding (logout).
    pub async fn unbind(&mut self) {
        self.current = None;
        if let Err(e) = self.store.clear().await {
            tracing::warn!(error = %e, "Failed to clear persisted identity binding");
        }
    }

    /// The currently bound user, if any.
    pub fn bound_user(&self) -> Option<&UserId> {
        self.current.as_ref()
    }

    /// The external customer id for the current binding, if any.
    ///
    /// `None` means the session is anonymous: entitlement queries are
    /// read-only and no purchase may be initiated.
    pub fn external_id(&self) -> Option<ExternalCustomerId> {
        self.current.as_ref().map(ExternalCustomerId::for_user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryIdentityStore;

    fn binder() -> IdentityBinder {
        IdentityBinder::new(Arc::new(InMemoryIdentityStore::new()))
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    #[tokio::test]
    async fn starts_unbound() {
        let binder = binder();
        assert!(binder.bound_user().is_none());
        assert!(binder.external_id().is_none());
    }

    #[tokio::test]
    async fn first_bind_reports_bound() {
        let mut binder = binder();
        let outcome = binder.bind(&user("usr_1")).await;
        assert_eq!(
            outcome,
            BindOutcome::Bound(ExternalCustomerId::from_raw("usr_1"))
        );
        assert_eq!(binder.bound_user(), Some(&user("usr_1")));
    }

    #[tokio::test]
    async fn rebinding_same_user_is_idempotent() {
        let mut binder = binder();
        let first = binder.bind(&user("usr_1")).await;
        let second = binder.bind(&user("usr_1")).await;

        assert_eq!(
            second,
            BindOutcome::AlreadyBound(ExternalCustomerId::from_raw("usr_1"))
        );
        assert_eq!(first.external_id(), second.external_id());
    }

    #[tokio::test]
    async fn binding_different_user_reports_switch() {
        let mut binder = binder();
        binder.bind(&user("usr_a")).await;
        let outcome = binder.bind(&user("usr_b")).await;

        assert_eq!(
            outcome,
            BindOutcome::Switched {
                previous: user("usr_a"),
                external_id: ExternalCustomerId::from_raw("usr_b"),
            }
        );
        assert_eq!(binder.bound_user(), Some(&user("usr_b")));
    }

    #[tokio::test]
    async fn unbind_clears_binding() {
        let mut binder = binder();
        binder.bind(&user("usr_1")).await;
        binder.unbind().await;

        assert!(binder.bound_user().is_none());
    }

    #[tokio::test]
    async fn binding_survives_restart_via_store() {
        let store = Arc::new(InMemoryIdentityStore::new());

        let mut first_launch = IdentityBinder::new(store.clone());
        first_launch.bind(&user("usr_1")).await;

        // Same store, new binder: simulates an app restart.
        let mut second_launch = IdentityBinder::new(store);
        second_launch.restore().await;

        // Logging in as a different user after restart is seen as a switch.
        let outcome = second_launch.bind(&user("usr_2")).await;
        assert!(matches!(outcome, BindOutcome::Switched { previous, .. } if previous == user("usr_1")));
    }

    #[tokio::test]
    async fn external_id_wraps_internal_user_id() {
        let mut binder = binder();
        binder.bind(&user("usr_42")).await;
        assert_eq!(
            binder.external_id(),
            Some(ExternalCustomerId::from_raw("usr_42"))
        );
    }
}
